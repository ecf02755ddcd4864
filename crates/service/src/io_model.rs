//! Input/output port descriptions and helpers to extract column and flow
//! variable names from them.

use serde::{Deserialize, Serialize};

/// Port type of data tables.
pub const TABLE_PORT_TYPE: &str = "table";
/// Port type of the flow variable pseudo-port.
pub const FLOW_VARIABLE_PORT_TYPE: &str = "flowVariable";

/// One input or output port as shown next to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutputModel {
	pub name: String,
	pub port_type: String,
	/// Columns of a table, or the variables of the flow variable port.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub_items: Option<Vec<SubItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItem {
	pub name: String,
	#[serde(rename = "type")]
	pub item_type: String,
	/// False for types the script language cannot represent.
	#[serde(default = "supported_by_default")]
	pub supported: bool,
}

fn supported_by_default() -> bool {
	true
}

/// Name and type of a column or flow variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameAndType {
	pub name: String,
	#[serde(rename = "type")]
	pub item_type: String,
}

impl From<&SubItem> for NameAndType {
	fn from(item: &SubItem) -> Self {
		Self {
			name: item.name.clone(),
			item_type: item.item_type.clone(),
		}
	}
}

fn supported(items: &[SubItem]) -> impl Iterator<Item = NameAndType> + '_ {
	items.iter().filter(|item| item.supported).map(NameAndType::from)
}

/// All supported columns of all tables, flattened.
pub fn supported_table_columns(models: &[InputOutputModel]) -> Vec<NameAndType> {
	models
		.iter()
		.filter(|m| m.port_type == TABLE_PORT_TYPE)
		.filter_map(|m| m.sub_items.as_deref())
		.flat_map(supported)
		.collect()
}

/// Supported columns per table.
pub fn tables(models: &[InputOutputModel]) -> Vec<Vec<NameAndType>> {
	tables_with_name_prefix(models, "")
}

/// Supported columns per table, for tables whose name starts with `prefix`.
pub fn tables_with_name_prefix(models: &[InputOutputModel], prefix: &str) -> Vec<Vec<NameAndType>> {
	models_with_name_prefix(models, TABLE_PORT_TYPE, prefix)
}

/// Supported sub-items per model of `port_type` whose name starts with `prefix`.
///
/// Models without sub-items contribute an empty entry.
pub fn models_with_name_prefix(models: &[InputOutputModel], port_type: &str, prefix: &str) -> Vec<Vec<NameAndType>> {
	models
		.iter()
		.filter(|m| m.port_type == port_type && m.name.starts_with(prefix))
		.map(|m| m.sub_items.as_deref().map(|items| supported(items).collect()).unwrap_or_default())
		.collect()
}

/// Supported flow variables of the first flow variable model.
pub fn supported_flow_variables(models: &[InputOutputModel]) -> Vec<NameAndType> {
	models
		.iter()
		.find(|m| m.port_type == FLOW_VARIABLE_PORT_TYPE)
		.and_then(|m| m.sub_items.as_deref())
		.map(|items| supported(items).collect())
		.unwrap_or_default()
}
