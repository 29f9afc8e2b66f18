use std::io::{self, ErrorKind};
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Receive timeout applied to every read.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

#[cfg(any(target_os = "linux", target_os = "android"))]
const SOCKET_FLAGS: libc::c_int = libc::SOCK_DGRAM | libc::SOCK_CLOEXEC;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const SOCKET_FLAGS: libc::c_int = libc::SOCK_DGRAM;

/// A UDP socket bound on the wildcard address, accepting datagrams from any sender.
pub struct UdpLink {
    socket: UdpSocket,
    host: String,
    local_addr: SocketAddr,
    last_peer: Option<SocketAddr>,
}

impl UdpLink {
    /// Create a datagram socket and bind it to `0.0.0.0:port`.
    ///
    /// `host` is kept for diagnostics only; the bind always uses the wildcard
    /// address. Port 0 binds an ephemeral port, see [`UdpLink::local_addr`].
    pub fn open(host: &str, port: u16) -> Result<Self> {
        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let fd = create_socket().map_err(|source| TransportError::Open {
            target: format!("udp socket for {host}:{port}"),
            source,
        })?;

        bind_wildcard(&fd, port).map_err(|source| TransportError::Bind {
            addr: bind_addr,
            source,
        })?;

        let socket = UdpSocket::from(fd);
        socket
            .set_read_timeout(Some(RECV_TIMEOUT))
            .map_err(|source| TransportError::Open {
                target: format!("udp socket for {host}:{port}"),
                source,
            })?;
        let local_addr = socket.local_addr().unwrap_or(bind_addr);

        if host != "0.0.0.0" {
            debug!(host, "datagram host is advisory, binding the wildcard address");
        }
        info!(%local_addr, "listening for udp telemetry");

        Ok(Self {
            socket,
            host: host.to_string(),
            local_addr,
            last_peer: None,
        })
    }

    /// Receive one datagram into `buf`.
    ///
    /// Returns the datagram length, or `Ok(0)` when nothing arrives within
    /// [`RECV_TIMEOUT`].
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.socket.recv_from(buf) {
            Ok((n, peer)) => {
                if self.last_peer != Some(peer) {
                    debug!(%peer, "receiving datagrams from new sender");
                    self.last_peer = Some(peer);
                }
                Ok(n)
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(err) => Err(TransportError::Read(err)),
        }
    }

    /// The address the socket is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The host from the connection address (not used for binding).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Source address of the most recent datagram.
    pub fn last_peer(&self) -> Option<SocketAddr> {
        self.last_peer
    }
}

impl Drop for UdpLink {
    fn drop(&mut self) {
        debug!(local_addr = %self.local_addr, "closing udp socket");
    }
}

impl std::fmt::Debug for UdpLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpLink")
            .field("host", &self.host)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

fn create_socket() -> io::Result<OwnedFd> {
    // SAFETY: plain socket(2) call with constant arguments.
    let fd = unsafe { libc::socket(libc::AF_INET, SOCKET_FLAGS, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` was just returned by socket(2) and is owned by nobody else.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

fn bind_wildcard(fd: &OwnedFd, port: u16) -> io::Result<()> {
    // SAFETY: all-zero is a valid `sockaddr_in`; the relevant fields are set below.
    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    addr.sin_family = libc::AF_INET as libc::sa_family_t;
    addr.sin_port = port.to_be();
    addr.sin_addr.s_addr = libc::INADDR_ANY;

    // SAFETY: `fd` is an open socket; `addr` is a valid `sockaddr_in` and the
    // length passed matches its size.
    let rc = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            (&addr as *const libc::sockaddr_in).cast::<libc::sockaddr>(),
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn loopback_target(link: &UdpLink) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, link.local_addr().port()))
    }

    #[test]
    fn binds_wildcard_ephemeral_port() {
        let link = UdpLink::open("127.0.0.1", 0).unwrap();
        assert!(link.local_addr().ip().is_unspecified());
        assert_ne!(link.local_addr().port(), 0);
        assert_eq!(link.host(), "127.0.0.1");
    }

    #[test]
    fn receives_datagram_from_any_sender() {
        let mut link = UdpLink::open("0.0.0.0", 0).unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"\xFD\x01telemetry", loopback_target(&link)).unwrap();

        let mut buf = [0u8; 2048];
        let n = link.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"\xFD\x01telemetry");
        assert_eq!(link.last_peer(), Some(sender.local_addr().unwrap()));
    }

    #[test]
    fn idle_read_times_out_with_zero_bytes() {
        let mut link = UdpLink::open("0.0.0.0", 0).unwrap();
        let mut buf = [0u8; 64];

        let start = Instant::now();
        let n = link.read(&mut buf).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(n, 0);
        assert!(elapsed >= Duration::from_millis(500), "returned too early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "blocked too long: {elapsed:?}");
    }

    #[test]
    fn port_in_use_is_bind_error() {
        let first = UdpLink::open("0.0.0.0", 0).unwrap();
        let port = first.local_addr().port();

        let err = UdpLink::open("0.0.0.0", port).unwrap_err();
        match err {
            TransportError::Bind { addr, source } => {
                assert_eq!(addr.port(), port);
                assert_eq!(source.kind(), ErrorKind::AddrInUse);
            }
            other => panic!("expected bind error, got {other}"),
        }
    }
}
