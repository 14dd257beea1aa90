//

use std::collections::HashMap;

use log::debug;

use crate::core::error::{Result, RuntimeError};
use crate::core::memory::{Addr, Memory};
use crate::core::object::{as_type, Object};
use crate::objects::method::{BoundMethodObject, UnboundMethodObject};

pub struct Runtime {
    mem: Memory,
    // globals double as the collection root
    globals: Addr,
    context_object: Addr,
    result: Option<Addr>,
}

struct Env {
    name_map: HashMap<String, Addr>,
}

impl Env {
    fn new() -> Self {
        Self {
            name_map: HashMap::new(),
        }
    }
}

impl Object for Env {
    fn get_property(&self, key: &str) -> Option<Addr> {
        self.name_map.get(key).cloned()
    }

    fn set_property(&mut self, key: &str, new_prop: Addr) {
        self.name_map.insert(key.to_string(), new_prop);
    }
}

impl Runtime {
    pub fn new(max_object_count: usize) -> Result<Self> {
        let mut mem = Memory::new(max_object_count);
        let globals = mem.append_object(Box::new(Env::new()))?;
        mem.set_root(globals)?;
        // top-level `this` is the globals object itself
        Ok(Runtime {
            mem,
            globals,
            context_object: globals,
            result: None,
        })
    }

    // <addr> = <object>
    pub fn append_object(&mut self, object: Box<dyn Object>) -> Result<Addr> {
        self.mem.append_object(object).map_err(Into::into)
    }

    // name = <addr>
    pub fn insert_name(&mut self, name: &str, addr: Addr) -> Result<()> {
        self.mem
            .set_object_property(self.globals, name, addr)
            .map_err(Into::into)
    }

    // <addr> = name
    pub fn find_name(&self, name: &str) -> Result<Addr> {
        self.mem
            .get_object(self.globals)?
            .get_property(name)
            .ok_or_else(|| RuntimeError::UndefinedName(name.to_string()))
    }

    // typed view of the object at `addr`
    pub fn get<T: 'static>(&self, addr: Addr) -> Result<&T> {
        let object = self.mem.get_object(addr)?;
        as_type::<T>(object).ok_or_else(|| RuntimeError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            actual: object.type_name(),
        })
    }

    // <addr> = receiver.name
    pub fn bind_method(&mut self, receiver: Addr, name: &str) -> Result<Addr> {
        let op = self
            .mem
            .get_object(receiver)?
            .find_operation(name)
            .ok_or_else(|| RuntimeError::NoSuchMethod(receiver, name.to_string()))?;
        let method = self
            .mem
            .append_object(Box::new(BoundMethodObject::new(receiver, op)))?;
        // a bound method keeps its receiver alive
        self.mem.hold(method, receiver)?;
        Ok(method)
    }

    // <addr> = method stripped of its receiver
    pub fn unbind_method(&mut self, method: Addr) -> Result<Addr> {
        let unbound = as_type::<BoundMethodObject>(self.mem.get_object(method)?)
            .ok_or(RuntimeError::NotCallable(method))?
            .unbind();
        self.mem
            .append_object(Box::new(unbound))
            .map_err(Into::into)
    }

    // <addr> = detached method bound to `receiver`
    pub fn rebind_method(&mut self, method: Addr, receiver: Addr) -> Result<Addr> {
        let unbound = as_type::<UnboundMethodObject>(self.mem.get_object(method)?)
            .ok_or(RuntimeError::NotCallable(method))?
            .clone();
        let bound = unbound.bind(receiver, self.mem.get_object(receiver)?)?;
        let rebound = self.mem.append_object(Box::new(bound))?;
        self.mem.hold(rebound, receiver)?;
        Ok(rebound)
    }

    // result = method()
    pub fn call_method(&mut self, method: Addr) -> Result<Option<Addr>> {
        let object = self.mem.get_object(method)?;
        if let Some(unbound) = as_type::<UnboundMethodObject>(object) {
            // no receiver to install as context, refuse before running
            return Err(RuntimeError::DetachedCall(unbound.operation().name));
        }
        let bound = as_type::<BoundMethodObject>(object)
            .ok_or(RuntimeError::NotCallable(method))?
            .clone();
        debug!(
            "calling '{}' declared by {} on {:?}",
            bound.operation().name,
            bound.operation().declaring,
            bound.receiver()
        );
        let backup_context = self.context_object;
        self.context_object = bound.receiver();
        self.result = None;
        let outcome = (bound.operation().run)(self);
        self.context_object = backup_context;
        outcome?;
        Ok(self.result.take())
    }

    // this
    pub fn context(&self) -> Addr {
        self.context_object
    }

    // result register, written by operation bodies
    pub fn set_result(&mut self, addr: Addr) {
        self.result = Some(addr);
    }

    pub fn garbage_collect(&mut self) {
        self.mem.collect();
    }
}
