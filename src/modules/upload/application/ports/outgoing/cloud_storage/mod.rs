mod object_storage;

pub use object_storage::{
    ObjectContent, ObjectStorage, StoreObject, StoreObjectError, StoreObjectInfoError,
};
