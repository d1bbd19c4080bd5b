use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xdynamic_engine::{Value, XmlObject};

fn address_book(count: usize) -> String {
    let mut source = String::from("<Root>");
    for i in 0..count {
        source.push_str(&format!(
            "<Address><Id _dataType=\"System.Int32\">{i}</Id><Name>{i} name value</Name></Address>"
        ));
    }
    source.push_str("</Root>");
    source
}

fn project_implicit_list(c: &mut Criterion) {
    let source = address_book(500);
    c.bench_function("project_implicit_list", |b| {
        b.iter(|| {
            // Fresh object per iteration so the member cache never answers
            let root = XmlObject::parse(&source).unwrap();
            black_box(root.get("Address").unwrap())
        })
    });
}

fn cached_member_read(c: &mut Criterion) {
    let root = XmlObject::parse(&address_book(500)).unwrap();
    // Cached objects live as long as a caller holds them
    let _warm = root.get("Address").unwrap();
    c.bench_function("cached_member_read", |b| {
        b.iter(|| black_box(root.get(black_box("Address")).unwrap()))
    });
}

fn scalar_write(c: &mut Criterion) {
    let root = XmlObject::new().unwrap();
    let mut n = 0i64;
    c.bench_function("scalar_write", |b| {
        b.iter(|| {
            n += 1;
            root.set("Counter", black_box(n)).unwrap()
        })
    });
}

fn list_write(c: &mut Criterion) {
    let root = XmlObject::new().unwrap();
    let items: Vec<Value> = (0..200i32).map(Value::from).collect();
    c.bench_function("list_write", |b| {
        b.iter(|| root.set("Items", Value::List(black_box(items.clone()))).unwrap())
    });
}

criterion_group!(
    benches,
    project_implicit_list,
    cached_member_read,
    scalar_write,
    list_write
);
criterion_main!(benches);
