//

extern crate rebound;
use rebound::core::runtime::Runtime;
use rebound::objects::mirror::MirrorObject;

fn main() {
    env_logger::init();

    let mut runtime = Runtime::new(128).unwrap();
    // t = Mirror.new
    let t = runtime.append_object(Box::new(MirrorObject)).unwrap();
    runtime.insert_name("t", t).unwrap();
    // f = t.foo()
    let foo = runtime.bind_method(t, "foo").unwrap();
    let f = runtime
        .call_method(foo)
        .unwrap()
        .expect("foo leaves a result");
    runtime.insert_name("f", f).unwrap();
    // p f.call() == t
    let result = runtime.call_method(f).unwrap(); // fails: 'bar' is detached from its receiver
    println!("{:?}", result == Some(t));
}
