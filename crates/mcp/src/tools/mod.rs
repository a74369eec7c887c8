pub mod plaid;
mod registry;

pub use plaid::{register_plaid_tools, FieldKind, FieldSpec, PlaidTool, PlaidToolSpec, PLAID_TOOLS};
pub use registry::{
    json_schema_number, json_schema_object, json_schema_record, json_schema_string, Tool,
    ToolRegistry,
};
