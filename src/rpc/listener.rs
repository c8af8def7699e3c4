//! The callee side of the transport: a listener that accepts TCP
//! connections and dispatches each to a bound implementation (`spec.md`
//! §4.1 "Server lifecycle", "Per-request protocol").
//!
//! Re-architected per §9's first redesign note: dispatch is a compile-time
//! table (the [`Dispatch`] trait implemented by each interface's handler)
//! rather than runtime reflection. The wire still carries parameter-type
//! descriptors (`spec.md` §6) so a listener can validate shape before
//! invoking anything, matching the "keep the descriptor list" option the
//! note leaves open.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::codec;
use super::failure::RemoteFailure;
use super::value::{TypeTag, Value};

/// The handler bound to a listener: one method-dispatch table per interface.
///
/// Implementations resolve `method` (plus, if they care to validate it,
/// `param_types`) to one of their declared methods and run it. A returned
/// `Err` is wrapped into the wire's remote-failure envelope; it is never a
/// transport error (`spec.md` §4.1: "every method declares a distinguished
/// transport error" is a contract on interface *definitions*, not something
/// `dispatch` itself can raise).
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    async fn dispatch(
        &self,
        method: &str,
        args: Vec<Value>,
        param_types: Vec<TypeTag>,
    ) -> Result<Value, RemoteFailure>;
}

/// Returned by the listener-error hook: whether the accept loop should keep
/// running after a top-level accept failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerDecision {
    Continue,
    Shutdown,
}

type ErrorHook = Arc<dyn Fn(&io::Error) -> ListenerDecision + Send + Sync>;
type StoppedHook = Arc<dyn Fn(Option<&io::Error>) + Send + Sync>;

/// A bound, not-yet-started server for one [`Dispatch`] implementation.
///
/// Lifecycle: `new -> listening -> stopped` (`spec.md` §4.1). `start`
/// consumes nothing reusable on `self` besides the hooks, so a fresh
/// `Listener` must be built to restart — matching "restart from stopped is
/// not supported".
pub struct Listener<D: Dispatch> {
    dispatch: Arc<D>,
    on_listener_error: Option<ErrorHook>,
    on_stopped: Option<StoppedHook>,
}

/// A started listener: the accept loop is running in its own task.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    stop: Arc<Notify>,
    stopped: Arc<AtomicBool>,
    accept_task: JoinHandle<()>,
}

impl<D: Dispatch> Listener<D> {
    pub fn new(dispatch: Arc<D>) -> Listener<D> {
        Listener { dispatch, on_listener_error: None, on_stopped: None }
    }

    /// Registers the listener-error hook (`spec.md` §4.1): called on a
    /// top-level exception in the accept loop, deciding continue vs.
    /// shutdown.
    pub fn on_listener_error<F>(mut self, hook: F) -> Listener<D>
    where
        F: Fn(&io::Error) -> ListenerDecision + Send + Sync + 'static,
    {
        self.on_listener_error = Some(Arc::new(hook));
        self
    }

    /// Registers the stopped hook, called once with the cause (`None` for a
    /// clean `stop()`).
    pub fn on_stopped<F>(mut self, hook: F) -> Listener<D>
    where
        F: Fn(Option<&io::Error>) + Send + Sync + 'static,
    {
        self.on_stopped = Some(Arc::new(hook));
        self
    }

    /// Binds `addr` (or an ephemeral port if `None`), spawns the accept
    /// loop, and returns a handle. This is the `new -> listening`
    /// transition.
    pub async fn start(self, addr: Option<SocketAddr>) -> io::Result<ListenerHandle> {
        let bind_addr = addr.unwrap_or_else(|| "127.0.0.1:0".parse().unwrap());
        let listener = TcpListener::bind(bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let stop = Arc::new(Notify::new());
        let stopped = Arc::new(AtomicBool::new(false));

        let accept_task = tokio::spawn(accept_loop(
            listener,
            self.dispatch,
            self.on_listener_error,
            self.on_stopped,
            stop.clone(),
            stopped.clone(),
        ));

        Ok(ListenerHandle { local_addr, stop, stopped, accept_task })
    }
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Closes the listening socket, breaking the accept loop. In-flight
    /// request handlers are allowed to complete; this does not wait for
    /// them (`spec.md` §4.1 "Server lifecycle").
    pub async fn stop(self) {
        self.stop.notify_one();
        let _ = self.accept_task.await;
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle").field("local_addr", &self.local_addr).finish()
    }
}

async fn accept_loop<D: Dispatch>(
    listener: TcpListener,
    dispatch: Arc<D>,
    on_listener_error: Option<ErrorHook>,
    on_stopped: Option<StoppedHook>,
    stop: Arc<Notify>,
    stopped: Arc<AtomicBool>,
) {
    let cause = loop {
        tokio::select! {
            _ = stop.notified() => {
                break None;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        let dispatch = dispatch.clone();
                        tokio::spawn(
                            handle_connection(socket, dispatch)
                                .instrument(tracing::info_span!("rpc_connection", %peer)),
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                        let decision = on_listener_error
                            .as_ref()
                            .map(|hook| hook(&e))
                            .unwrap_or(ListenerDecision::Continue);
                        if decision == ListenerDecision::Shutdown {
                            break Some(e);
                        }
                    }
                }
            }
        }
    };

    stopped.store(true, Ordering::SeqCst);
    if let Some(hook) = on_stopped {
        hook(cause.as_ref());
    }
}

#[tracing::instrument(skip(socket, dispatch))]
async fn handle_connection<D: Dispatch>(mut socket: TcpStream, dispatch: Arc<D>) {
    if let Err(e) = serve_one(&mut socket, dispatch.as_ref()).await {
        tracing::warn!(error = %e, "request handling failed");
    }
}

async fn serve_one<D: Dispatch>(socket: &mut TcpStream, dispatch: &D) -> io::Result<()> {
    let mut request = Vec::new();
    socket.read_to_end(&mut request).await?;
    let (method, args, param_types) = codec::read_call(&mut request.as_slice())?;

    let mut reply = Vec::new();
    match dispatch.dispatch(&method, args, param_types).await {
        Ok(value) => codec::write_reply_ok(&mut reply, &value)?,
        Err(failure) => codec::write_reply_failure(&mut reply, &failure)?,
    }

    socket.write_all(&reply).await?;
    socket.shutdown().await?;
    Ok(())
}
