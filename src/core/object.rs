//

use std::any::Any;

use crate::core::memory::Addr;
use crate::objects::method::Operation;

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

pub trait Object: AsAny {
    fn get_property(&self, _key: &str) -> Option<Addr> {
        None
    }

    fn set_property(&mut self, _key: &str, _new_prop: Addr) {
        //
    }

    // runtime lookup of a named operation, the first step of binding
    fn find_operation(&self, _name: &str) -> Option<Operation> {
        None
    }
}

pub fn as_type<T: Any>(object: &dyn Object) -> Option<&T> {
    object.as_any().downcast_ref::<T>()
}
