mod local_store;

pub use local_store::LocalMediaStore;
