//! Dispatch-table bindings from wire calls to [`StorageNode`] methods.

use std::sync::Arc;

use async_trait::async_trait;

use crate::rpc::{Dispatch, FailureKind, RemoteFailure, TypeTag, Value};

use super::{Error, StorageNode};

fn bad_args(method: &str) -> RemoteFailure {
    RemoteFailure::new(FailureKind::ProgrammerError, format!("bad arguments for {method}"))
}

/// The data interface: `size`, `read`, `write` (`spec.md` §4.2).
pub struct DataDispatch {
    node: Arc<StorageNode>,
}

impl DataDispatch {
    pub fn new(node: Arc<StorageNode>) -> DataDispatch {
        DataDispatch { node }
    }
}

#[async_trait]
impl Dispatch for DataDispatch {
    async fn dispatch(
        &self,
        method: &str,
        mut args: Vec<Value>,
        _param_types: Vec<TypeTag>,
    ) -> Result<Value, RemoteFailure> {
        match method {
            "size" => {
                let path = take_path(&mut args, 0).ok_or_else(|| bad_args(method))?;
                self.node.size(&path).await.map(Value::U64).map_err(Error::into_remote_failure)
            }
            "read" => {
                if args.len() != 3 {
                    return Err(bad_args(method));
                }
                let path = take_path(&mut args, 0).ok_or_else(|| bad_args(method))?;
                let offset = args[1].as_i64().ok_or_else(|| bad_args(method))?;
                let length = args[2].as_i64().ok_or_else(|| bad_args(method))?;
                self.node
                    .read(&path, offset, length)
                    .await
                    .map(Value::Bytes)
                    .map_err(Error::into_remote_failure)
            }
            "write" => {
                if args.len() != 3 {
                    return Err(bad_args(method));
                }
                let path = take_path(&mut args, 0).ok_or_else(|| bad_args(method))?;
                let offset = args[1].as_i64().ok_or_else(|| bad_args(method))?;
                let data = args[2].as_bytes().ok_or_else(|| bad_args(method))?.to_vec();
                self.node
                    .write(&path, offset, &data)
                    .await
                    .map(|()| Value::Unit)
                    .map_err(Error::into_remote_failure)
            }
            other => Err(RemoteFailure::new(FailureKind::ProgrammerError, format!("no such method {other}"))),
        }
    }
}

/// The control interface: `create`, `delete` (`spec.md` §4.2).
pub struct ControlDispatch {
    node: Arc<StorageNode>,
}

impl ControlDispatch {
    pub fn new(node: Arc<StorageNode>) -> ControlDispatch {
        ControlDispatch { node }
    }
}

#[async_trait]
impl Dispatch for ControlDispatch {
    async fn dispatch(
        &self,
        method: &str,
        mut args: Vec<Value>,
        _param_types: Vec<TypeTag>,
    ) -> Result<Value, RemoteFailure> {
        match method {
            "create" => {
                let path = take_path(&mut args, 0).ok_or_else(|| bad_args(method))?;
                self.node.create(&path).await.map(Value::Bool).map_err(Error::into_remote_failure)
            }
            "delete" => {
                let path = take_path(&mut args, 0).ok_or_else(|| bad_args(method))?;
                self.node.delete(&path).await.map(Value::Bool).map_err(Error::into_remote_failure)
            }
            other => Err(RemoteFailure::new(FailureKind::ProgrammerError, format!("no such method {other}"))),
        }
    }
}

fn take_path(args: &mut [Value], idx: usize) -> Option<crate::path::Path> {
    args.get(idx).and_then(|v| v.as_path()).cloned()
}
