//! Built-in directive handlers.

use std::rc::Rc;

use tracing::debug;

use super::interpolate::Template;
use super::Binder;
use crate::dom::UiNode;
use crate::error::Result;
use crate::reactive::{Collector, Path, Value};

/// Two-way value binding.
///
/// The watcher is created (and subscribed) before the input listener is
/// attached and before the initial value write.
pub fn model<N: UiNode>(binder: &mut Binder<'_>, node: &N, expression: &str) -> Result<()> {
    let path = Path::parse(expression)?;

    let target = node.clone();
    binder.watch(path.clone(), move |value| {
        target.set_value(&value.to_string());
        Ok(())
    })?;

    let model = binder.model().clone();
    let write_path = path.clone();
    node.add_input_listener(Rc::new(move |input: &str| -> Result<()> {
        write_path.assign(&model, Value::from(input))?;
        Ok(())
    }));

    let initial = Collector::untracked(|| path.resolve(binder.model()))?;
    node.set_value(&initial.to_string());

    debug!(path = %path, "value binding attached");
    Ok(())
}

/// Text interpolation.
///
/// One watcher per marker occurrence; any of them re-renders the whole text.
pub fn text<N: UiNode>(binder: &mut Binder<'_>, node: &N, expression: &str) -> Result<()> {
    let config = binder.config();
    let template = Rc::new(Template::parse(
        expression,
        &config.delimiters,
        config.trim_interpolation,
    )?);

    let paths: Vec<Path> = template.paths().cloned().collect();
    for path in paths {
        let target = node.clone();
        let template = Rc::clone(&template);
        let model = binder.model().clone();
        binder.watch(path, move |_| {
            target.set_text(&template.render(&model)?);
            Ok(())
        })?;
    }

    node.set_text(&template.render(binder.model())?);

    debug!(bindings = template.paths().count(), "text binding attached");
    Ok(())
}
