//! Bluetooth RFCOMM connector (Linux).
//!
//! Opens an `AF_BLUETOOTH` stream socket through libc. The endpoint address
//! is the device address (`AA:BB:CC:DD:EE:FF`), the channel is the RFCOMM
//! channel (1-30).

use std::fs::File;
use std::io::{self, Read, Write};
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::transport::{Connector, SessionOptions};

const BTPROTO_RFCOMM: libc::c_int = 3;

/// Highest valid RFCOMM server channel.
const MAX_RFCOMM_CHANNEL: u8 = 30;

/// `struct sockaddr_rc` from `<bluetooth/rfcomm.h>`.
#[repr(C)]
struct SockaddrRc {
    rc_family: libc::sa_family_t,
    rc_bdaddr: [u8; 6],
    rc_channel: u8,
}

/// Parses `AA:BB:CC:DD:EE:FF` into a `bdaddr_t`, which stores the bytes
/// in reverse order.
fn parse_bdaddr(address: &str) -> io::Result<[u8; 6]> {
    let invalid = || {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid Bluetooth address: {:?}", address),
        )
    };

    let mut bdaddr = [0u8; 6];
    let mut parts = address.split(':');
    for slot in bdaddr.iter_mut().rev() {
        let part = parts.next().ok_or_else(invalid)?;
        if part.len() != 2 {
            return Err(invalid());
        }
        *slot = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(bdaddr)
}

fn rfcomm_channel(endpoint: &Endpoint) -> io::Result<u8> {
    match u8::try_from(endpoint.channel()) {
        Ok(channel) if (1..=MAX_RFCOMM_CHANNEL).contains(&channel) => Ok(channel),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid RFCOMM channel: {}", endpoint.channel()),
        )),
    }
}

fn set_timeout(fd: &OwnedFd, option: libc::c_int, timeout: Option<Duration>) -> io::Result<()> {
    let Some(timeout) = timeout else {
        return Ok(());
    };
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    let rc = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            option,
            &tv as *const libc::timeval as *const libc::c_void,
            mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Connects over Bluetooth RFCOMM.
#[derive(Debug, Clone, Copy, Default)]
pub struct RfcommConnector;

impl RfcommConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for RfcommConnector {
    type Stream = RfcommStream;

    fn open(&self, endpoint: &Endpoint, options: &SessionOptions) -> io::Result<RfcommStream> {
        let addr = SockaddrRc {
            rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            rc_bdaddr: parse_bdaddr(endpoint.address())?,
            rc_channel: rfcomm_channel(endpoint)?,
        };

        let fd = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
                BTPROTO_RFCOMM,
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `fd` is a freshly created socket owned by nobody else.
        let socket = unsafe { OwnedFd::from_raw_fd(fd) };

        set_timeout(&socket, libc::SO_RCVTIMEO, options.read_timeout)?;
        set_timeout(&socket, libc::SO_SNDTIMEO, options.write_timeout)?;

        debug!(endpoint = %endpoint, "connecting RFCOMM socket");
        let rc = unsafe {
            libc::connect(
                socket.as_raw_fd(),
                &addr as *const SockaddrRc as *const libc::sockaddr,
                mem::size_of::<SockaddrRc>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(RfcommStream {
            inner: File::from(socket),
        })
    }
}

/// Connected RFCOMM socket.
#[derive(Debug)]
pub struct RfcommStream {
    inner: File,
}

impl Read for RfcommStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for RfcommStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
