//! SSH infrastructure: implements `SessionConnector` and `RemoteSession`
//! on top of libssh2.
//!
//! libssh2 is blocking, so every call runs on `spawn_blocking`. The session
//! and its lazily opened SFTP channel sit behind one mutex: libssh2 sessions
//! are not safe for concurrent use, and the orchestrator never needs more
//! than one operation in flight.

use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail, ensure};
use ssh2::{Channel, CheckResult, KnownHostFileKind, Session, Sftp};

use crate::application::ports::{RemoteSession, SessionConnector};
use crate::domain::command::CommandResult;
use crate::domain::config::{Credential, DEFAULT_PORT, HostKeyPolicy, RemoteTarget};

const KNOWN_HOSTS_COMMENT: &str = "added by hoist";

/// Production connector backed by the `ssh2` crate.
pub struct Ssh2Connector;

impl SessionConnector for Ssh2Connector {
    type Session = Ssh2Session;

    async fn connect(&self, target: &RemoteTarget, timeout: Duration) -> Result<Ssh2Session> {
        let target = target.clone();
        let session = tokio::task::spawn_blocking(move || open_session(&target, timeout))
            .await
            .map_err(|e| anyhow!("spawn_blocking panicked: {e}"))??;
        Ok(Ssh2Session {
            inner: Arc::new(Mutex::new(Inner {
                session,
                sftp: None,
            })),
        })
    }
}

struct Inner {
    session: Session,
    sftp: Option<Sftp>,
}

impl Inner {
    fn sftp(&mut self) -> Result<&Sftp> {
        if self.sftp.is_none() {
            let sftp = self.session.sftp().context("opening SFTP channel")?;
            self.sftp = Some(sftp);
        }
        self.sftp
            .as_ref()
            .ok_or_else(|| anyhow!("SFTP channel unavailable"))
    }
}

/// One authenticated libssh2 session.
pub struct Ssh2Session {
    inner: Arc<Mutex<Inner>>,
}

impl Ssh2Session {
    async fn with_inner<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = inner
                .lock()
                .map_err(|_| anyhow!("SSH session lock poisoned"))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| anyhow!("spawn_blocking panicked: {e}"))?
    }
}

impl RemoteSession for Ssh2Session {
    async fn run_command(&self, command: &str) -> Result<CommandResult> {
        let command = command.to_string();
        self.with_inner(move |inner| exec(&inner.session, &command))
            .await
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let local = local.to_path_buf();
        let remote = PathBuf::from(remote);
        self.with_inner(move |inner| sftp_upload(inner, &local, &remote))
            .await
    }

    async fn close(self) -> Result<()> {
        self.with_inner(|inner| {
            inner.sftp = None;
            inner
                .session
                .disconnect(None, "deployment finished", None)
                .context("disconnecting")
        })
        .await
    }
}

// ── Blocking helpers ──────────────────────────────────────────────────────────

fn open_session(target: &RemoteTarget, timeout: Duration) -> Result<Session> {
    let addr = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .with_context(|| format!("resolving {}", target.host))?
        .next()
        .ok_or_else(|| anyhow!("{} resolved to no addresses", target.host))?;
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .with_context(|| format!("connecting to {addr}"))?;
    tracing::debug!(%addr, "tcp connected");

    let mut session = Session::new().context("creating SSH session")?;
    session.set_tcp_stream(tcp);
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.handshake().context("SSH handshake")?;

    check_host_key(&session, target)?;
    authenticate(&session, target)?;

    // Commands may legitimately run longer than the connect budget.
    session.set_timeout(0);
    Ok(session)
}

fn check_host_key(session: &Session, target: &RemoteTarget) -> Result<()> {
    let (key, key_type) = session
        .host_key()
        .ok_or_else(|| anyhow!("server sent no host key"))?;
    let key = key.to_vec();

    let mut known_hosts = session.known_hosts().context("initialising known hosts")?;
    let path = &target.known_hosts;
    if path.exists() {
        known_hosts
            .read_file(path, KnownHostFileKind::OpenSSH)
            .with_context(|| format!("reading {}", path.display()))?;
    }

    match known_hosts.check_port(&target.host, target.port, &key) {
        CheckResult::Match => Ok(()),
        CheckResult::Mismatch => bail!(
            "host key for {} has changed; remove the old entry from {} if the change is expected",
            target.host,
            path.display()
        ),
        CheckResult::Failure => bail!("host key check for {} failed", target.host),
        CheckResult::NotFound => match target.host_key_policy {
            HostKeyPolicy::Strict => bail!(
                "host key for {} is not in {} and host_key_policy is strict",
                target.host,
                path.display()
            ),
            HostKeyPolicy::AcceptNew => {
                known_hosts
                    .add(
                        &known_hosts_entry(&target.host, target.port),
                        &key,
                        KNOWN_HOSTS_COMMENT,
                        key_type.into(),
                    )
                    .context("recording host key")?;
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                known_hosts
                    .write_file(path, KnownHostFileKind::OpenSSH)
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::warn!(host = %target.host, file = %path.display(), "unknown host key accepted and recorded");
                Ok(())
            }
        },
    }
}

/// OpenSSH spelling of a host in `known_hosts`.
fn known_hosts_entry(host: &str, port: u16) -> String {
    if port == DEFAULT_PORT {
        host.to_string()
    } else {
        format!("[{host}]:{port}")
    }
}

fn authenticate(session: &Session, target: &RemoteTarget) -> Result<()> {
    let user = target.user.as_str();
    match &target.credential {
        Credential::Password(password) => session
            .userauth_password(user, password)
            .context("password authentication")?,
        Credential::IdentityFile { path, passphrase } => session
            .userauth_pubkey_file(user, None, path, passphrase.as_deref())
            .with_context(|| format!("key authentication with {}", path.display()))?,
        Credential::Agent => session
            .userauth_agent(user)
            .context("ssh-agent authentication")?,
    }
    ensure!(
        session.authenticated(),
        "authentication as {user} was rejected"
    );
    tracing::debug!(user, method = target.credential.kind(), "authenticated");
    Ok(())
}

fn sftp_upload(inner: &mut Inner, local: &Path, remote: &Path) -> Result<()> {
    let mut source =
        std::fs::File::open(local).with_context(|| format!("opening {}", local.display()))?;
    let sftp = inner.sftp()?;
    let mut dest = sftp
        .create(remote)
        .with_context(|| format!("creating remote file {}", remote.display()))?;
    let bytes = std::io::copy(&mut source, &mut dest)
        .with_context(|| format!("writing remote file {}", remote.display()))?;
    tracing::debug!(local = %local.display(), remote = %remote.display(), bytes, "sftp upload complete");
    Ok(())
}

fn exec(session: &Session, command: &str) -> Result<CommandResult> {
    let mut channel = session.channel_session().context("opening channel")?;
    channel.exec(command).context("starting remote command")?;

    session.set_blocking(false);
    let drained = drain(&mut channel);
    session.set_blocking(true);
    let (stdout, stderr) = drained.context("reading remote output")?;

    channel.wait_close().context("waiting for channel close")?;
    let exit_code = channel.exit_status().context("reading exit status")?;
    // libssh2 reports status 0 when the process died without sending one.
    let signal = channel
        .exit_signal()
        .context("reading exit signal")?
        .exit_signal
        .filter(|name| !name.is_empty());
    if let Some(signal) = &signal {
        tracing::debug!(command, signal, "remote command killed by signal");
    }
    Ok(CommandResult {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        signal,
    })
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The two output streams of a running remote command, read without blocking.
trait OutputStreams {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// The remote side has closed both streams.
    fn finished(&self) -> bool;
}

impl OutputStreams for Channel {
    fn read_stdout(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream(0).read(buf)
    }

    fn read_stderr(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stderr().read(buf)
    }

    fn finished(&self) -> bool {
        Channel::eof(self)
    }
}

/// Read stdout and stderr in turn until both are exhausted.
///
/// Reading one stream to the end first would deadlock once the other fills
/// the channel window.
fn drain(streams: &mut impl OutputStreams) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut buf = [0u8; 16 * 1024];
    loop {
        let read = streams.read_stdout(&mut buf);
        let got_stdout = keep(read, &buf, &mut stdout)?;
        let read = streams.read_stderr(&mut buf);
        let got_stderr = keep(read, &buf, &mut stderr)?;
        if !got_stdout && !got_stderr {
            if streams.finished() {
                return Ok((stdout, stderr));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Append what one read produced. `false` when it produced nothing.
fn keep(read: io::Result<usize>, buf: &[u8], sink: &mut Vec<u8>) -> io::Result<bool> {
    match read {
        Ok(0) => Ok(false),
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(e),
    }
}
