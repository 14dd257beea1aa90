//

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::debug;

use crate::core::object::Object;

#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub struct Addr(usize);

// fixed-capacity heap; `Addr` equality is object identity
pub struct Memory {
    max_object_count: usize,
    slots: HashMap<Addr, Box<dyn Object>>,
    addr_counter: usize,
    root: Option<Addr>,
    // holder -> holdees, walked by `collect`
    edges: HashMap<Addr, HashSet<Addr>>,
}

#[derive(Debug, Fail)]
pub enum MemoryError {
    #[fail(display = "memory is full")]
    Full,
    #[fail(display = "access invalid address {:?}", _0)]
    InvalidAddr(Addr),
}

impl Memory {
    pub fn new(max_object_count: usize) -> Self {
        Memory {
            max_object_count,
            slots: HashMap::new(),
            addr_counter: 0,
            root: None,
            edges: HashMap::new(),
        }
    }

    pub fn append_object(&mut self, object: Box<dyn Object>) -> Result<Addr, MemoryError> {
        if self.slots.len() == self.max_object_count {
            self.collect();
            if self.slots.len() == self.max_object_count {
                return Err(MemoryError::Full);
            }
        }
        let addr = Addr(self.addr_counter);
        self.addr_counter += 1;
        self.slots.insert(addr, object);
        self.edges.insert(addr, HashSet::new());
        Ok(addr)
    }

    pub fn get_object(&self, addr: Addr) -> Result<&dyn Object, MemoryError> {
        match self.slots.get(&addr) {
            Some(object) => Ok(&**object),
            None => Err(MemoryError::InvalidAddr(addr)),
        }
    }

    pub fn get_object_mut(&mut self, addr: Addr) -> Result<&mut dyn Object, MemoryError> {
        match self.slots.get_mut(&addr) {
            Some(object) => Ok(&mut **object),
            None => Err(MemoryError::InvalidAddr(addr)),
        }
    }

    pub fn set_root(&mut self, addr: Addr) -> Result<(), MemoryError> {
        self.get_object(addr)?;
        self.root = Some(addr);
        Ok(())
    }

    pub fn hold(&mut self, holder: Addr, holdee: Addr) -> Result<(), MemoryError> {
        self.get_object(holdee)?;
        self.edges
            .get_mut(&holder)
            .ok_or(MemoryError::InvalidAddr(holder))?
            .insert(holdee);
        Ok(())
    }

    pub fn drop(&mut self, holder: Addr, holdee: Addr) -> Result<(), MemoryError> {
        self.edges
            .get_mut(&holder)
            .ok_or(MemoryError::InvalidAddr(holder))?
            .remove(&holdee);
        Ok(())
    }

    // mark everything reachable from the root, sweep the rest
    pub fn collect(&mut self) {
        let now = Instant::now();

        let mut marked = HashSet::new();
        let mut worklist: Vec<Addr> = self.root.into_iter().collect();
        while let Some(addr) = worklist.pop() {
            if !marked.insert(addr) {
                continue;
            }
            worklist.extend(self.edges[&addr].iter().cloned());
        }

        let before = self.slots.len();
        self.slots.retain(|addr, _| marked.contains(addr));
        self.edges.retain(|addr, _| marked.contains(addr));

        debug!(
            "garbage collected, {} alive, {} dead, duration: {} ms",
            self.slots.len(),
            before - self.slots.len(),
            now.elapsed().as_micros() as f64 / 1000.0
        );
    }

    // property write that keeps the holder's edges in sync
    pub fn set_object_property(
        &mut self,
        addr: Addr,
        key: &str,
        new_prop: Addr,
    ) -> Result<(), MemoryError> {
        if let Some(old_prop) = self.get_object(addr)?.get_property(key) {
            self.drop(addr, old_prop)?;
        }
        self.get_object_mut(addr)?.set_property(key, new_prop);
        self.hold(addr, new_prop)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::as_type;
    use crate::objects::int::IntObject;

    #[derive(Debug)]
    struct DummyObject;
    impl Object for DummyObject {}

    #[derive(Debug, Default)]
    struct SlotObject {
        slots: HashMap<String, Addr>,
    }

    impl Object for SlotObject {
        fn get_property(&self, key: &str) -> Option<Addr> {
            self.slots.get(key).cloned()
        }

        fn set_property(&mut self, key: &str, new_prop: Addr) {
            self.slots.insert(key.to_string(), new_prop);
        }
    }

    #[test]
    fn heap_hands_back_what_it_stored() {
        let mut mem = Memory::new(4);
        let a = mem.append_object(Box::new(IntObject(42))).unwrap();
        let b = mem.append_object(Box::new(IntObject(43))).unwrap();
        assert_ne!(a, b);
        let returned = mem.get_object(a).unwrap();
        assert_eq!(as_type::<IntObject>(returned), Some(&IntObject(42)));
        assert!(mem.get_object(Addr(100)).is_err());
    }

    #[test]
    fn full_heap_of_live_objects_refuses_allocation() {
        let mut mem = Memory::new(1);
        let root = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.set_root(root).unwrap();
        match mem.append_object(Box::new(DummyObject)) {
            Err(MemoryError::Full) => (),
            other => panic!("expected full heap, got {:?}", other),
        }
    }

    #[test]
    fn allocation_reclaims_unreachable_objects_first() {
        let mut mem = Memory::new(2);
        let root = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.set_root(root).unwrap();
        let orphan = mem.append_object(Box::new(DummyObject)).unwrap();
        // heap is full, but `orphan` is unreachable and makes room
        let third = mem.append_object(Box::new(DummyObject)).unwrap();
        assert!(mem.get_object(orphan).is_err());
        assert!(mem.get_object(third).is_ok());
    }

    #[test]
    fn edges_keep_holdees_alive() {
        let mut mem = Memory::new(4);
        let root = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.set_root(root).unwrap();
        let held = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.hold(root, held).unwrap();
        let chained = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.hold(held, chained).unwrap();
        mem.collect();
        assert!(mem.get_object(held).is_ok());
        assert!(mem.get_object(chained).is_ok());
    }

    #[test]
    fn dropping_an_edge_frees_the_holdee() {
        let mut mem = Memory::new(4);
        let root = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.set_root(root).unwrap();
        let held = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.hold(root, held).unwrap();
        mem.drop(root, held).unwrap();
        mem.collect();
        assert!(mem.get_object(held).is_err());
        assert!(mem.get_object(root).is_ok());
    }

    #[test]
    fn replacing_a_property_releases_the_old_value() {
        let mut mem = Memory::new(4);
        let root = mem.append_object(Box::new(SlotObject::default())).unwrap();
        mem.set_root(root).unwrap();
        let first = mem.append_object(Box::new(IntObject(1))).unwrap();
        let second = mem.append_object(Box::new(IntObject(2))).unwrap();
        mem.set_object_property(root, "x", first).unwrap();
        mem.set_object_property(root, "x", second).unwrap();
        mem.collect();
        assert!(mem.get_object(first).is_err());
        assert_eq!(mem.get_object(root).unwrap().get_property("x"), Some(second));
    }

    #[test]
    fn cycles_detached_from_the_root_are_collected() {
        let mut mem = Memory::new(4);
        let root = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.set_root(root).unwrap();
        let a = mem.append_object(Box::new(DummyObject)).unwrap();
        let b = mem.append_object(Box::new(DummyObject)).unwrap();
        mem.hold(a, b).unwrap();
        mem.hold(b, a).unwrap();
        mem.collect();
        assert!(mem.get_object(a).is_err());
        assert!(mem.get_object(b).is_err());
    }

    #[test]
    fn random_edges_keep_exactly_the_reachable() {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        for _ in 0..10 {
            let mut mem = Memory::new(512);
            let root = mem.append_object(Box::new(IntObject(0))).unwrap();
            mem.set_root(root).unwrap();
            let mut population = vec![root];
            let mut reachable = HashSet::new();
            reachable.insert(root);
            // edges only ever point from an older object to a newer one, so
            // reachability can be tracked as objects are created
            for serial in 1..512 {
                let obj = mem.append_object(Box::new(IntObject(serial))).unwrap();
                for _ in 0..rng.gen_range(0, 3) {
                    let holder = population[rng.gen_range(0, population.len())];
                    mem.hold(holder, obj).unwrap();
                    if reachable.contains(&holder) {
                        reachable.insert(obj);
                    }
                }
                population.push(obj);
            }
            mem.collect();
            for addr in population {
                assert_eq!(mem.get_object(addr).is_ok(), reachable.contains(&addr));
            }
        }
    }
}
