//! Builds the [`BindingModel`] from the IR and the resolved graph.

use indexmap::IndexMap;
use tracing::debug;

use ton_abi_resolver::InterfaceGraph;
use ton_abi_schema::{map_parameter, map_type, MessageDefinition, Parameter, SchemaDocument};

use crate::model::{
    BindingClass, BindingModel, DataType, Field, MessageField, QueryRecipe, ResultShape,
    SendRecipe,
};
use crate::naming::{module_name, rust_ident, to_pascal_case, Namer};
use crate::render::{taken_type_names, BINDING_IMPORTS, MESSAGE_IMPORTS};
use crate::rust_type::{default_value, rust_type, store_op, Position};

/// Inherent and trait method names every binding struct already has.
const RESERVED_METHODS: &[&str] = &[
    "new",
    "address",
    "runtime",
    "interface_name",
    "query_probes",
    "send_probes",
    "run_query_probe",
    "run_send_probe",
];

pub fn build_model(doc: &SchemaDocument, graph: &InterfaceGraph) -> BindingModel {
    let table = DataTypeTable::build(doc);

    let binding_scope = taken_type_names(BINDING_IMPORTS);
    let mut type_names = Namer::with_reserved(&binding_scope);
    let mut module_names = Namer::with_reserved(&["messages", "registry"]);
    let mut classes = Vec::new();

    for name in graph.topo_order() {
        let Some(decl) = doc.find_interface(name) else {
            continue;
        };
        let members = graph.effective_members(name).cloned().unwrap_or_default();
        let type_name = type_names.claim(to_pascal_case(name));

        let mut methods = Namer::with_reserved(RESERVED_METHODS);
        let mut record_names = Namer::with_reserved(&binding_scope);
        record_names.claim(type_name.clone());

        let queries = members
            .get_methods
            .iter()
            .filter_map(|m| doc.find_get_method(m))
            .map(|method| {
                let plain = plain_ident(&method.name);
                let fn_name = methods.claim(rust_ident(&method.name));
                let probe_fn = methods.claim(format!("probe_{}", plain));
                let inputs = fields(&method.inputs, Position::QueryInput, true);
                let probe_with_fn =
                    (!inputs.is_empty()).then(|| methods.claim(format!("probe_{}_with", plain)));
                let result = result_shape(&method.outputs, &method.name, &mut record_names);
                QueryRecipe {
                    method: method.name.clone(),
                    fn_name,
                    probe_fn,
                    probe_with_fn,
                    inputs,
                    result,
                }
            })
            .collect();

        let sends = members
            .inbound_messages
            .iter()
            .filter_map(|m| table.lookup(m))
            .map(|(message, data_type)| {
                let plain = plain_ident(message);
                SendRecipe {
                    message: message.to_string(),
                    fn_name: methods.claim(format!("send_{}", plain)),
                    probe_fn: methods.claim(format!("probe_send_{}", plain)),
                    data_type: data_type.type_name.clone(),
                    opcode: data_type.opcode.clone(),
                    fields: data_type.fields.clone(),
                }
            })
            .collect();

        classes.push(BindingClass {
            interface: name.clone(),
            type_name,
            module_name: module_names.claim(module_name(name)),
            fingerprint: decl.fingerprint.clone(),
            lineage: graph.lineage(name).to_vec(),
            queries,
            sends,
            outbound_messages: members.outbound_messages,
        });
    }

    debug!(
        classes = classes.len(),
        data_types = table.types.len(),
        "built binding model"
    );

    BindingModel {
        classes,
        data_types: table.types,
        registration_order: graph.reverse_topo_order().to_vec(),
        warnings: graph.warnings().to_vec(),
    }
}

/// Identifier without the raw prefix, for use inside composed names.
fn plain_ident(name: &str) -> String {
    rust_ident(name).trim_start_matches("r#").to_string()
}

fn fields(params: &[Parameter], position: Position, with_category: bool) -> Vec<Field> {
    let mut namer = Namer::default();
    params
        .iter()
        .map(|param| {
            let category = if with_category {
                map_parameter(param)
            } else {
                map_type(&param.raw_type)
            };
            Field {
                name: param.name.clone(),
                ident: namer.claim(rust_ident(&param.name)),
                rust_type: rust_type(&category, position),
                default: default_value(&category, position),
                category,
            }
        })
        .collect()
}

fn result_shape(outputs: &[Parameter], method: &str, record_names: &mut Namer) -> ResultShape {
    let mut fields = fields(outputs, Position::QueryOutput, true);
    match fields.len() {
        0 => ResultShape::Unit,
        1 => ResultShape::Single(fields.remove(0)),
        _ => ResultShape::Record {
            type_name: record_names.claim(format!("{}Result", to_pascal_case(method))),
            fields,
        },
    }
}

fn message_fields(def: &MessageDefinition) -> Vec<MessageField> {
    fields(&def.params, Position::MessageField, false)
        .into_iter()
        .map(|field| MessageField {
            op: store_op(&field.category),
            field,
        })
        .collect()
}

/// Message name to data type. A definition name reused by a different body
/// gets a type named after the declaring message instead.
struct DataTypeTable {
    types: Vec<DataType>,
    by_message: IndexMap<String, usize>,
}

impl DataTypeTable {
    fn build(doc: &SchemaDocument) -> Self {
        let mut table = Self {
            types: Vec::new(),
            by_message: IndexMap::new(),
        };
        let mut names = Namer::with_reserved(&taken_type_names(MESSAGE_IMPORTS));
        let mut by_definition: IndexMap<&str, usize> = IndexMap::new();

        for msg in &doc.messages {
            if table.by_message.contains_key(&msg.name) {
                continue;
            }
            let Some(def) = msg.definition() else {
                continue;
            };

            let fields = message_fields(def);
            if let Some(&idx) = by_definition.get(def.definition_name.as_str()) {
                let existing = &table.types[idx];
                if existing.opcode == def.opcode && existing.fields == fields {
                    table.by_message.insert(msg.name.clone(), idx);
                    continue;
                }
                debug!(
                    message = %msg.name,
                    definition = %def.definition_name,
                    "definition name reused with a different body"
                );
            }

            let base = if by_definition.contains_key(def.definition_name.as_str()) {
                &msg.name
            } else {
                &def.definition_name
            };
            let idx = table.types.len();
            table.types.push(DataType {
                type_name: names.claim(to_pascal_case(base)),
                definition_name: def.definition_name.clone(),
                opcode: def.opcode.clone(),
                fields,
                return_type: def.return_type.clone(),
            });
            by_definition.entry(def.definition_name.as_str()).or_insert(idx);
            table.by_message.insert(msg.name.clone(), idx);
        }
        table
    }

    fn lookup<'a>(&self, message: &'a str) -> Option<(&'a str, &DataType)> {
        let idx = *self.by_message.get(message)?;
        Some((message, &self.types[idx]))
    }
}
