//

use crate::core::error::RuntimeError;
use crate::core::object::Object;
use crate::core::runtime::Runtime;
use crate::objects::method::Operation;

// `bar` hands back its receiver, `foo` hands back `bar` detached from it
#[derive(Debug)]
pub struct MirrorObject;

fn foo(runtime: &mut Runtime) -> Result<(), RuntimeError> {
    let this = runtime.context();
    let bound = runtime.bind_method(this, "bar")?;
    let detached = runtime.unbind_method(bound)?;
    runtime.set_result(detached);
    Ok(())
}

fn bar(runtime: &mut Runtime) -> Result<(), RuntimeError> {
    let this = runtime.context();
    runtime.set_result(this);
    Ok(())
}

impl Object for MirrorObject {
    fn find_operation(&self, name: &str) -> Option<Operation> {
        match name {
            "foo" => Some(Operation::new::<MirrorObject>("foo", foo)),
            "bar" => Some(Operation::new::<MirrorObject>("bar", bar)),
            _ => None,
        }
    }
}
