use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub const PRIMARY_HOST: &str = "huggingface.co";
pub const MIRROR_HOST: &str = "hf-mirror.com";
pub const PROBE_PORT: u16 = 443;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Short TCP probe with an explicit per-call timeout. Resolution failures
/// count as unreachable.
pub fn is_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    let Ok(addrs) = (host, port).to_socket_addrs() else {
        return false;
    };

    for addr in addrs {
        if TcpStream::connect_timeout(&addr, timeout).is_ok() {
            return true;
        }
    }
    false
}

/// Pure host substitution; every other URL component is left untouched.
pub fn apply_mirror(url: &str, primary_host: &str, mirror_host: &str) -> String {
    if url.contains(primary_host) {
        url.replace(primary_host, mirror_host)
    } else {
        url.to_string()
    }
}

/// Rewrites a source URL to the mirror host, but only when the URL references
/// the primary host and the primary host fails the reachability probe.
pub struct MirrorResolver {
    primary_host: String,
    mirror_host: String,
    port: u16,
    timeout: Duration,
    probe: fn(&str, u16, Duration) -> bool,
}

impl MirrorResolver {
    pub fn new() -> Self {
        Self {
            primary_host: PRIMARY_HOST.to_string(),
            mirror_host: MIRROR_HOST.to_string(),
            port: PROBE_PORT,
            timeout: PROBE_TIMEOUT,
            probe: is_reachable,
        }
    }

    #[cfg(test)]
    pub fn with_probe(probe: fn(&str, u16, Duration) -> bool) -> Self {
        Self {
            probe,
            ..Self::new()
        }
    }

    pub fn resolve(&self, url: &str) -> String {
        if !url.contains(&self.primary_host) {
            return url.to_string();
        }

        if (self.probe)(&self.primary_host, self.port, self.timeout) {
            return url.to_string();
        }

        tracing::info!(url, mirror = %self.mirror_host, "primary host unreachable, using mirror");
        apply_mirror(url, &self.primary_host, &self.mirror_host)
    }
}

impl Default for MirrorResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn local_listener_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(is_reachable("127.0.0.1", port, Duration::from_secs(1)));
    }

    #[test]
    fn unresolvable_host_is_unreachable() {
        assert!(!is_reachable(
            "no-such-host.invalid",
            443,
            Duration::from_millis(100)
        ));
    }

    #[test]
    fn mirror_substitution_preserves_other_components() {
        let url = "https://huggingface.co/org/repo/resolve/main/file.bin?download=true";
        let mirrored = apply_mirror(url, PRIMARY_HOST, MIRROR_HOST);
        assert_eq!(
            mirrored,
            "https://hf-mirror.com/org/repo/resolve/main/file.bin?download=true"
        );
    }

    #[test]
    fn non_primary_url_is_unchanged() {
        let url = "https://example.com/file.bin";
        assert_eq!(apply_mirror(url, PRIMARY_HOST, MIRROR_HOST), url);
    }

    #[test]
    fn resolver_rewrites_only_when_unreachable() {
        let url = "https://huggingface.co/org/repo";

        let unreachable = MirrorResolver::with_probe(|_, _, _| false);
        assert_eq!(unreachable.resolve(url), "https://hf-mirror.com/org/repo");

        let reachable = MirrorResolver::with_probe(|_, _, _| true);
        assert_eq!(reachable.resolve(url), url);
    }

    #[test]
    fn resolver_skips_probe_for_other_hosts() {
        // Probe that would panic if consulted.
        let resolver = MirrorResolver::with_probe(|_, _, _| panic!("probe must not run"));
        assert_eq!(
            resolver.resolve("https://example.com/a.bin"),
            "https://example.com/a.bin"
        );
    }
}
