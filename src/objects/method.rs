//

use std::any::{type_name, Any, TypeId};

use crate::core::error::RuntimeError;
use crate::core::memory::Addr;
use crate::core::object::Object;
use crate::core::runtime::Runtime;

// operation bodies receive their instance through the runtime context
pub type NativeFn = fn(&mut Runtime) -> Result<(), RuntimeError>;

// a named operation together with the type declaring it
#[derive(Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub declaring: &'static str,
    declaring_id: TypeId,
    pub run: NativeFn,
}

impl Operation {
    pub fn new<T: Any>(name: &'static str, run: NativeFn) -> Self {
        Operation {
            name,
            declaring: type_name::<T>(),
            declaring_id: TypeId::of::<T>(),
            run,
        }
    }
}

// a callable tied to a specific instance
#[derive(Clone)]
pub struct BoundMethodObject {
    receiver: Addr,
    op: Operation,
}

impl BoundMethodObject {
    pub fn new(receiver: Addr, op: Operation) -> Self {
        BoundMethodObject { receiver, op }
    }

    pub fn receiver(&self) -> Addr {
        self.receiver
    }

    pub fn operation(&self) -> Operation {
        self.op
    }

    // strip the receiver
    pub fn unbind(&self) -> UnboundMethodObject {
        UnboundMethodObject { op: self.op }
    }
}

impl Object for BoundMethodObject {}

// a callable tied to an operation and its declaring type, but to no instance;
// it cannot run until a receiver is supplied again
#[derive(Clone)]
pub struct UnboundMethodObject {
    op: Operation,
}

impl UnboundMethodObject {
    pub fn operation(&self) -> Operation {
        self.op
    }

    // supply a receiver; it must be an instance of the declaring type
    pub fn bind(
        &self,
        receiver: Addr,
        object: &dyn Object,
    ) -> Result<BoundMethodObject, RuntimeError> {
        if object.as_any().type_id() != self.op.declaring_id {
            return Err(RuntimeError::TypeMismatch {
                expected: self.op.declaring,
                actual: object.type_name(),
            });
        }
        Ok(BoundMethodObject {
            receiver,
            op: self.op,
        })
    }
}

impl Object for UnboundMethodObject {}
