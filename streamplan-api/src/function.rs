//! Typed bodies of native operators.
//!
//! Each DSL call boxes the user closure into one of these wrappers and stores it
//! type-erased in the operator. A runtime gets it back with
//! [`NativeFunction::downcast_ref`](streamplan_core::operator::NativeFunction::downcast_ref)
//! using the element types of the stream it came from.

/// Produces the elements of a source.
pub struct SourceFunction<T> {
    produce: Box<dyn Fn() -> Vec<T> + Send + Sync>,
}

impl<T> SourceFunction<T> {
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn() -> Vec<T> + Send + Sync + 'static,
    {
        Self {
            produce: Box::new(produce),
        }
    }

    pub fn run(&self) -> Vec<T> {
        (self.produce)()
    }
}

pub struct MapFunction<T, R> {
    apply: Box<dyn Fn(T) -> R + Send + Sync>,
}

impl<T, R> MapFunction<T, R> {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self {
            apply: Box::new(apply),
        }
    }

    pub fn apply(&self, value: T) -> R {
        (self.apply)(value)
    }
}

pub struct FlatMapFunction<T, R> {
    apply: Box<dyn Fn(T) -> Vec<R> + Send + Sync>,
}

impl<T, R> FlatMapFunction<T, R> {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(T) -> Vec<R> + Send + Sync + 'static,
    {
        Self {
            apply: Box::new(apply),
        }
    }

    pub fn apply(&self, value: T) -> Vec<R> {
        (self.apply)(value)
    }
}

pub struct FilterFunction<T> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> FilterFunction<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }

    pub fn test(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}

/// Folds two elements with the same key into one.
pub struct ReduceFunction<T> {
    reduce: Box<dyn Fn(T, T) -> T + Send + Sync>,
}

impl<T> ReduceFunction<T> {
    pub fn new<F>(reduce: F) -> Self
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        Self {
            reduce: Box::new(reduce),
        }
    }

    pub fn reduce(&self, acc: T, value: T) -> T {
        (self.reduce)(acc, value)
    }
}

/// Pairs matching elements of the two sides of a join.
pub struct JoinFunction<L, R, O> {
    join: Box<dyn Fn(&L, &R) -> Option<O> + Send + Sync>,
}

impl<L, R, O> JoinFunction<L, R, O> {
    pub fn new<F>(join: F) -> Self
    where
        F: Fn(&L, &R) -> Option<O> + Send + Sync + 'static,
    {
        Self {
            join: Box::new(join),
        }
    }

    pub fn join(&self, left: &L, right: &R) -> Option<O> {
        (self.join)(left, right)
    }
}

pub struct SinkFunction<T> {
    sink: Box<dyn Fn(&T) + Send + Sync>,
}

impl<T> SinkFunction<T> {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            sink: Box::new(sink),
        }
    }

    pub fn invoke(&self, value: &T) {
        (self.sink)(value)
    }
}
