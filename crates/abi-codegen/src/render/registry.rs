use super::{file_header, rust_string, CodeWriter, EmittedBindings};
use crate::model::BindingModel;

/// Render `registry.rs` with `register_all`.
pub fn render_registry(model: &BindingModel) -> String {
    let mut w = CodeWriter::new();
    file_header(&mut w, "Interface name to binding factory registration.");
    w.blank();
    w.line("use ton_abi_probe::BindingRegistry;");
    w.blank();
    w.line("/// Register every generated binding, most derived interface first.");
    w.open("pub fn register_all(registry: &mut BindingRegistry)");
    for interface in &model.registration_order {
        let Some(class) = model.class(interface) else {
            continue;
        };
        let path = format!("super::{}::{}", class.module_name, class.type_name);
        w.open(format!(
            "registry.register({}, |address, runtime|",
            rust_string(&class.interface)
        ));
        w.line(format!("Box::new({}::new(address, runtime))", path));
        w.close(");");
    }
    w.close("");
    w.finish()
}

/// Render `mod.rs` declaring every generated module.
pub fn render_module_index(model: &BindingModel) -> String {
    let mut w = CodeWriter::new();
    file_header(&mut w, "Generated contract bindings.");
    w.blank();
    w.line("pub mod messages;");
    w.line("pub mod registry;");
    for class in &model.classes {
        w.line(format!("pub mod {};", class.module_name));
    }
    w.blank();
    for class in &model.classes {
        w.line(format!("pub use {}::{};", class.module_name, class.type_name));
    }
    w.line("pub use registry::register_all;");
    w.finish()
}

/// Every generated module inlined into one file, for `include!` from a build
/// script's output. Same items as the directory layout behind `mod.rs`.
pub fn render_bundle(model: &BindingModel, emitted: &EmittedBindings) -> String {
    let mut w = CodeWriter::new();
    w.line("// Generated contract bindings, one inline module per file.");
    w.line("// Generated by ton-abi-bindgen. Do not edit manually.");
    inline_module(&mut w, "messages", &emitted.data_types);
    inline_module(&mut w, "registry", &emitted.registry);
    for class in &model.classes {
        if let Some(file) = emitted.bindings.get(&class.interface) {
            inline_module(&mut w, &class.module_name, &file.source);
        }
    }
    w.blank();
    for class in &model.classes {
        w.line(format!("pub use {}::{};", class.module_name, class.type_name));
    }
    w.line("pub use registry::register_all;");
    w.finish()
}

fn inline_module(w: &mut CodeWriter, module: &str, source: &str) {
    w.blank();
    w.open(format!("pub mod {}", module));
    for line in source.lines() {
        w.line(line);
    }
    w.close("");
}
