//! Example: a tab component with a delegated click handler and a synced
//! `selected` attribute
//!
//! Run with `RUST_LOG=debug` to see lifecycle transitions.

use graft_dom::{Document, Event};
use graft_lifecycle::{
    AttributeDecl, ComponentBehavior, ComponentDefinition, ComponentRegistry, LifecycleConfig,
    Runtime,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = ComponentRegistry::new();
    registry.define(
        ComponentDefinition::builder("x-tabs")
            .attribute(
                "selected",
                AttributeDecl::handler(|rt, el, change| {
                    println!("{} selected: {:?} -> {:?}", el, change.old_value, change.new_value);
                    rt.set_property(el, "changes", 1.0)?;
                    Ok(())
                })
                .with_default("0"),
            )
            .on("click [data-index]", |rt, el, _, tab| {
                let index = rt
                    .document()
                    .get_attribute(tab, "data-index")
                    .unwrap_or("0")
                    .to_string();
                rt.set_property(el, "selected", index.as_str())?;
                Ok(())
            })
            .prototype(ComponentBehavior::new().value("changes", 0.0))
            .attached(|_, el| {
                println!("{} attached", el);
                Ok(())
            })
            .build(),
    )?;

    let mut document = Document::new();
    let tabs = document.create_element("x-tabs");
    let root = document.root();
    document.append_child(root, tabs)?;
    let mut buttons = Vec::new();
    for index in 0..3 {
        let button = document.create_element("button");
        document.set_attribute(button, "data-index", &index.to_string())?;
        document.append_child(tabs, button)?;
        buttons.push(button);
    }

    let mut runtime = Runtime::new(document, registry, LifecycleConfig::default());
    runtime.start()?;

    runtime.dispatch_event(buttons[2], &mut Event::new("click"))?;
    runtime.deliver_mutations()?;

    println!("selected = {:?}", runtime.property(tabs, "selected"));
    Ok(())
}
