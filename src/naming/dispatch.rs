//! Dispatch-table bindings from wire calls to [`NamingNode`] methods.

use std::sync::Arc;

use async_trait::async_trait;

use crate::path::Path;
use crate::rpc::{Dispatch, FailureKind, RemoteFailure, TypeTag, Value};
use crate::storage::{ControlProxy, DataProxy};

use super::{Error, NamingNode};

fn bad_args(method: &str) -> RemoteFailure {
    RemoteFailure::new(FailureKind::ProgrammerError, format!("bad arguments for {method}"))
}

fn arg_path(args: &[Value], idx: usize) -> Option<Path> {
    args.get(idx).and_then(|v| v.as_path()).cloned()
}

/// The client interface: `isDirectory`, `list`, `createFile`,
/// `createDirectory`, `delete`, `getStorage` (`spec.md` §4.3).
pub struct ClientDispatch {
    node: Arc<NamingNode>,
}

impl ClientDispatch {
    pub fn new(node: Arc<NamingNode>) -> ClientDispatch {
        ClientDispatch { node }
    }
}

#[async_trait]
impl Dispatch for ClientDispatch {
    async fn dispatch(
        &self,
        method: &str,
        args: Vec<Value>,
        _param_types: Vec<TypeTag>,
    ) -> Result<Value, RemoteFailure> {
        let path = arg_path(&args, 0).ok_or_else(|| bad_args(method))?;
        match method {
            "isDirectory" => self.node.is_directory(&path).await.map(Value::Bool).map_err(Error::into_remote_failure),
            "list" => self
                .node
                .list(&path)
                .await
                .map(|names| Value::List(names.into_iter().map(Value::Str).collect()))
                .map_err(Error::into_remote_failure),
            "createFile" => {
                self.node.create_file(&path).await.map(Value::Bool).map_err(Error::into_remote_failure)
            }
            "createDirectory" => {
                self.node.create_directory(&path).await.map(Value::Bool).map_err(Error::into_remote_failure)
            }
            "delete" => self.node.delete(&path).await.map(Value::Bool).map_err(Error::into_remote_failure),
            "getStorage" => self
                .node
                .get_storage(&path)
                .await
                .map(Value::from)
                .map_err(Error::into_remote_failure),
            other => Err(RemoteFailure::new(FailureKind::ProgrammerError, format!("no such method {other}"))),
        }
    }
}

/// The registration interface: `register` (`spec.md` §4.3).
pub struct RegistrationDispatch {
    node: Arc<NamingNode>,
}

impl RegistrationDispatch {
    pub fn new(node: Arc<NamingNode>) -> RegistrationDispatch {
        RegistrationDispatch { node }
    }
}

#[async_trait]
impl Dispatch for RegistrationDispatch {
    async fn dispatch(
        &self,
        method: &str,
        args: Vec<Value>,
        _param_types: Vec<TypeTag>,
    ) -> Result<Value, RemoteFailure> {
        if method != "register" {
            return Err(RemoteFailure::new(FailureKind::ProgrammerError, format!("no such method {method}")));
        }
        if args.len() != 3 {
            return Err(bad_args(method));
        }
        let data = DataProxy::try_from(args[0].clone()).map_err(|_| bad_args(method))?;
        let control = ControlProxy::try_from(args[1].clone()).map_err(|_| bad_args(method))?;
        let paths: Vec<Path> = args[2]
            .as_list()
            .ok_or_else(|| bad_args(method))?
            .iter()
            .map(|v| v.as_path().cloned())
            .collect::<Option<Vec<Path>>>()
            .ok_or_else(|| bad_args(method))?;

        self.node
            .register(data, control, paths)
            .await
            .map(|dups| Value::List(dups.into_iter().map(Value::Path).collect()))
            .map_err(Error::into_remote_failure)
    }
}
