use std::{cell::Cell, rc::Rc};

use bencher::{benchmark_group, benchmark_main, Bencher};
use reactive_property::prelude::*;

fn counter(hits: &Rc<Cell<u64>>) -> SharedObserver {
  let hits = hits.clone();
  Rc::new(move || {
    hits.set(hits.get() + 1);
    false
  })
}

fn set_with_64_observers(b: &mut Bencher) {
  let hits = Rc::new(Cell::new(0));
  let property = Property::new(0u64);
  for _ in 0..64 {
    property.subscribe(counter(&hits));
  }

  let mut value = 0;
  b.iter(|| {
    value += 1;
    property.set(value);
  });
  bencher::black_box(hits.get());
}

fn subscribe_then_self_unsubscribe(b: &mut Bencher) {
  let property = Property::new(0u64);
  let once: SharedObserver = Rc::new(|| true);

  b.iter(|| {
    for _ in 0..16 {
      property.subscribe(once.clone());
    }
    property.set(1);
    bencher::black_box(property.cell().map(|cell| cell.subscriber_count()));
  });
}

fn unsubscribe_by_identity(b: &mut Bencher) {
  let hits = Rc::new(Cell::new(0));
  let property = Property::new(0u64);
  let observers: Vec<SharedObserver> = (0..32).map(|_| counter(&hits)).collect();

  b.iter(|| {
    for observer in &observers {
      property.subscribe(observer.clone());
    }
    for observer in observers.iter().rev() {
      property.unsubscribe(observer);
    }
  });
}

benchmark_group!(
  benches,
  set_with_64_observers,
  subscribe_then_self_unsubscribe,
  unsubscribe_by_identity
);
benchmark_main!(benches);
