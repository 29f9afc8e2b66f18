use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::address::BaudRate;
use crate::error::{Result, TransportError};

/// Inter-byte read timeout in tenths of a second (`VTIME`).
pub const READ_TIMEOUT_DECISECONDS: libc::cc_t = 10;

/// A serial device configured for raw 8N1 reads with a one-second timeout.
///
/// The descriptor is owned by a [`File`], so it is closed exactly once when the
/// port is dropped, including on every error path inside [`SerialPort::open`].
pub struct SerialPort {
    file: File,
    device: PathBuf,
    baud: BaudRate,
}

impl SerialPort {
    /// Open and configure `device` at `baud`.
    pub fn open(device: impl AsRef<Path>, baud: BaudRate) -> Result<Self> {
        let device = device.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&device)
            .map_err(|source| TransportError::Open {
                target: format!("serial device {}", device.display()),
                source,
            })?;

        configure_raw(&file, baud).map_err(|source| TransportError::Config {
            device: device.clone(),
            source,
        })?;

        info!(device = %device.display(), %baud, "connected to serial device");

        Ok(Self { file, device, baud })
    }

    /// Read available bytes into `buf`.
    ///
    /// Returns as soon as at least one byte is available, or `Ok(0)` after about
    /// one second without data.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(err) if matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(err) => Err(TransportError::Read(err)),
        }
    }

    /// The device path this port was opened from.
    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn baud(&self) -> BaudRate {
        self.baud
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        debug!(device = %self.device.display(), "closing serial device");
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("device", &self.device)
            .field("baud", &self.baud)
            .finish()
    }
}

fn configure_raw(file: &File, baud: BaudRate) -> io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: `termios` is a plain C struct for which all-zero is a valid value;
    // it is fully overwritten by `tcgetattr` below.
    let mut tty: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor owned by `file` and `tty` is a valid,
    // writable `termios`.
    if unsafe { libc::tcgetattr(fd, &mut tty) } != 0 {
        return Err(io::Error::last_os_error());
    }

    apply_line_settings(&mut tty);

    let speed = speed_for(baud);
    // SAFETY: `tty` is a valid `termios` and `speed` is one of the libc `B*` constants.
    if unsafe { libc::cfsetospeed(&mut tty, speed) } != 0
        || unsafe { libc::cfsetispeed(&mut tty, speed) } != 0
    {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: `fd` is still owned by `file`; `tty` was initialised by `tcgetattr`.
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tty) } != 0 {
        return Err(io::Error::last_os_error());
    }

    debug!(fd, %baud, "applied raw line settings");
    Ok(())
}

/// Raw 8N1: no translation, echo, or signal characters; no flow control;
/// receiver on; `VMIN = 0`, `VTIME = 10`.
fn apply_line_settings(tty: &mut libc::termios) {
    tty.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    tty.c_oflag = 0;
    tty.c_lflag = 0;

    tty.c_cflag = (tty.c_cflag & !libc::CSIZE) | libc::CS8;
    tty.c_cflag &= !(libc::PARENB | libc::PARODD | libc::CSTOPB | libc::CRTSCTS);
    tty.c_cflag |= libc::CLOCAL | libc::CREAD;

    tty.c_cc[libc::VMIN] = 0;
    tty.c_cc[libc::VTIME] = READ_TIMEOUT_DECISECONDS;
}

fn speed_for(baud: BaudRate) -> libc::speed_t {
    match baud {
        BaudRate::B9600 => libc::B9600,
        BaudRate::B19200 => libc::B19200,
        BaudRate::B38400 => libc::B38400,
        BaudRate::B57600 => libc::B57600,
        BaudRate::B115200 => libc::B115200,
    }
}
