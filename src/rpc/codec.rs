//! Wire codec: length-prefixed, big-endian, tagged-value framing.
//!
//! Grounded in the teacher's `src/serializer/mod.rs` (XDR-style helpers
//! built on `byteorder`) and `src/parser/primitive.rs` (the matching
//! reader side), generalized from the NFSv3/MOUNT wire format to the
//! generic `(method, args, parameter types)` / `(value | remote failure)`
//! shapes `spec.md` §6 specifies.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::failure::{FailureKind, RemoteFailure};
use super::value::{self, InterfaceTag, TypeTag, Value};

/// Maximum string/byte-vector length accepted on decode, guarding against a
/// corrupt or hostile length prefix driving an unbounded allocation.
const MAX_BLOB_LEN: u32 = 64 * 1024 * 1024;

fn write_len_prefixed(w: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    let len: u32 = bytes
        .len()
        .try_into()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "value exceeds u32 length"))?;
    w.write_u32::<BigEndian>(len)?;
    w.write_all(bytes)
}

fn read_len_prefixed(r: &mut impl Read) -> io::Result<Vec<u8>> {
    let len = r.read_u32::<BigEndian>()?;
    if len > MAX_BLOB_LEN {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "declared length too large"));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn write_string(w: &mut impl Write, s: &str) -> io::Result<()> {
    write_len_prefixed(w, s.as_bytes())
}

fn read_string(r: &mut impl Read) -> io::Result<String> {
    let bytes = read_len_prefixed(r)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Writes one self-describing [`Value`]: a one-byte tag followed by payload.
pub fn write_value(w: &mut impl Write, value: &Value) -> io::Result<()> {
    w.write_u8(value::type_tag_to_u8(value.type_tag()))?;
    match value {
        Value::Unit => Ok(()),
        Value::Bool(b) => w.write_u8(if *b { 1 } else { 0 }),
        Value::U32(n) => w.write_u32::<BigEndian>(*n),
        Value::U64(n) => w.write_u64::<BigEndian>(*n),
        Value::I64(n) => w.write_i64::<BigEndian>(*n),
        Value::Bytes(b) => write_len_prefixed(w, b),
        Value::Str(s) => write_string(w, s),
        Value::Path(p) => write_string(w, &p.to_string()),
        Value::List(items) => {
            w.write_u32::<BigEndian>(items.len() as u32)?;
            for item in items {
                write_value(w, item)?;
            }
            Ok(())
        }
        Value::Proxy(tag, addr) => {
            w.write_u8(value::interface_tag_to_u8(*tag))?;
            write_string(w, &addr.to_string())
        }
    }
}

/// Reads one self-describing [`Value`] written by [`write_value`].
pub fn read_value(r: &mut impl Read) -> io::Result<Value> {
    let tag_byte = r.read_u8()?;
    let tag = value::type_tag_from_u8(tag_byte)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown type tag"))?;
    read_value_body(r, tag)
}

fn read_value_body(r: &mut impl Read, tag: TypeTag) -> io::Result<Value> {
    match tag {
        TypeTag::Unit => Ok(Value::Unit),
        TypeTag::Bool => Ok(Value::Bool(r.read_u8()? != 0)),
        TypeTag::U32 => Ok(Value::U32(r.read_u32::<BigEndian>()?)),
        TypeTag::U64 => Ok(Value::U64(r.read_u64::<BigEndian>()?)),
        TypeTag::I64 => Ok(Value::I64(r.read_i64::<BigEndian>()?)),
        TypeTag::Bytes => Ok(Value::Bytes(read_len_prefixed(r)?)),
        TypeTag::Str => Ok(Value::Str(read_string(r)?)),
        TypeTag::Path => {
            let s = read_string(r)?;
            s.parse()
                .map(Value::Path)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        }
        TypeTag::List => {
            let len = r.read_u32::<BigEndian>()?;
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                items.push(read_value(r)?);
            }
            Ok(Value::List(items))
        }
        TypeTag::Proxy => {
            let iface_byte = r.read_u8()?;
            let iface = value::interface_tag_from_u8(iface_byte)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown interface tag"))?;
            let addr_str = read_string(r)?;
            let addr = addr_str
                .parse()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "malformed proxy address"))?;
            Ok(Value::Proxy(iface, addr))
        }
    }
}

/// One outbound method-call frame: method name, argument tuple, then the
/// parameter-type descriptors used for dispatch-table lookup (`spec.md` §6).
pub fn write_call(w: &mut impl Write, method: &str, args: &[Value]) -> io::Result<()> {
    write_string(w, method)?;
    w.write_u32::<BigEndian>(args.len() as u32)?;
    for arg in args {
        write_value(w, arg)?;
    }
    w.write_u32::<BigEndian>(args.len() as u32)?;
    for arg in args {
        w.write_u8(value::type_tag_to_u8(arg.type_tag()))?;
    }
    Ok(())
}

/// Reads one method-call frame written by [`write_call`].
///
/// Returns the method name, the decoded arguments, and the declared
/// parameter-type descriptors so the caller can validate them against the
/// dispatch table before invoking anything (`spec.md` §4.1).
pub fn read_call(r: &mut impl Read) -> io::Result<(String, Vec<Value>, Vec<TypeTag>)> {
    let method = read_string(r)?;
    let arg_count = r.read_u32::<BigEndian>()?;
    let mut args = Vec::with_capacity(arg_count as usize);
    for _ in 0..arg_count {
        args.push(read_value(r)?);
    }
    let type_count = r.read_u32::<BigEndian>()?;
    let mut types = Vec::with_capacity(type_count as usize);
    for _ in 0..type_count {
        let byte = r.read_u8()?;
        let tag = value::type_tag_from_u8(byte)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown type tag"))?;
        types.push(tag);
    }
    Ok((method, args, types))
}

/// Outer reply discriminant: a plain value, or a remote-exception wrapper.
const REPLY_OK: u8 = 0;
const REPLY_REMOTE_FAILURE: u8 = 1;

/// Writes a successful reply.
pub fn write_reply_ok(w: &mut impl Write, value: &Value) -> io::Result<()> {
    w.write_u8(REPLY_OK)?;
    write_value(w, value)
}

/// Writes a reply wrapping a remote exception, preserving its cause chain
/// (`spec.md` §6: "a wrapper carrying a remote exception and its original
/// cause chain").
pub fn write_reply_failure(w: &mut impl Write, failure: &RemoteFailure) -> io::Result<()> {
    w.write_u8(REPLY_REMOTE_FAILURE)?;
    w.write_u8(failure.kind as u8)?;
    write_string(w, &failure.message)?;
    w.write_u32::<BigEndian>(failure.cause_chain.len() as u32)?;
    for cause in &failure.cause_chain {
        write_string(w, cause)?;
    }
    Ok(())
}

/// The decoded form of a reply frame.
pub enum ReplyFrame {
    Ok(Value),
    RemoteFailure(RemoteFailure),
}

/// Reads a reply frame written by [`write_reply_ok`] or [`write_reply_failure`].
pub fn read_reply(r: &mut impl Read) -> io::Result<ReplyFrame> {
    match r.read_u8()? {
        REPLY_OK => Ok(ReplyFrame::Ok(read_value(r)?)),
        REPLY_REMOTE_FAILURE => {
            let kind_byte = r.read_u8()?;
            let kind = FailureKind::from_u8(kind_byte)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown failure kind"))?;
            let message = read_string(r)?;
            let cause_count = r.read_u32::<BigEndian>()?;
            let mut cause_chain = Vec::with_capacity(cause_count as usize);
            for _ in 0..cause_count {
                cause_chain.push(read_string(r)?);
            }
            Ok(ReplyFrame::RemoteFailure(RemoteFailure { kind, message, cause_chain }))
        }
        other => Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown reply tag {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    fn round_trip(v: Value) -> Value {
        let mut buf = Vec::new();
        write_value(&mut buf, &v).unwrap();
        read_value(&mut buf.as_slice()).unwrap()
    }

    #[test]
    fn primitive_values_round_trip() {
        assert_eq!(round_trip(Value::Unit), Value::Unit);
        assert_eq!(round_trip(Value::Bool(true)), Value::Bool(true));
        assert_eq!(round_trip(Value::U64(42)), Value::U64(42));
        assert_eq!(round_trip(Value::I64(-7)), Value::I64(-7));
        assert_eq!(round_trip(Value::Bytes(vec![1, 2, 3])), Value::Bytes(vec![1, 2, 3]));
        assert_eq!(round_trip(Value::Str("hi".into())), Value::Str("hi".into()));
    }

    #[test]
    fn path_round_trips_through_string_form() {
        let p: Path = "/a/b".parse().unwrap();
        assert_eq!(round_trip(Value::Path(p.clone())), Value::Path(p));
    }

    #[test]
    fn list_round_trips() {
        let v = Value::List(vec![Value::U32(1), Value::Str("x".into())]);
        assert_eq!(round_trip(v.clone()), v);
    }

    #[test]
    fn proxy_round_trips() {
        let addr: std::net::SocketAddr = "127.0.0.1:9001".parse().unwrap();
        let v = Value::Proxy(InterfaceTag::Data, addr);
        assert_eq!(round_trip(v.clone()), v);
    }

    #[test]
    fn call_frame_round_trips() {
        let mut buf = Vec::new();
        let args = vec![Value::U32(1), Value::Str("x".into())];
        write_call(&mut buf, "size", &args).unwrap();
        let (method, decoded_args, types) = read_call(&mut buf.as_slice()).unwrap();
        assert_eq!(method, "size");
        assert_eq!(decoded_args, args);
        assert_eq!(types, vec![TypeTag::U32, TypeTag::Str]);
    }

    #[test]
    fn reply_ok_round_trips() {
        let mut buf = Vec::new();
        write_reply_ok(&mut buf, &Value::U64(0)).unwrap();
        match read_reply(&mut buf.as_slice()).unwrap() {
            ReplyFrame::Ok(Value::U64(0)) => {}
            _ => panic!("expected Ok(0)"),
        }
    }

    #[test]
    fn reply_failure_round_trips() {
        let failure = RemoteFailure {
            kind: FailureKind::NotFound,
            message: "no such file".into(),
            cause_chain: vec!["io error".into()],
        };
        let mut buf = Vec::new();
        write_reply_failure(&mut buf, &failure).unwrap();
        match read_reply(&mut buf.as_slice()).unwrap() {
            ReplyFrame::RemoteFailure(f) => assert_eq!(f, failure),
            _ => panic!("expected a remote failure"),
        }
    }
}
