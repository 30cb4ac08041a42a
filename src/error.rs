use std::fmt;

#[derive(Debug)]
pub enum RailError {
    Timeout,
    ConnectionFailed(String),
    DnsResolution(String),
    ProxyError(String),
    RateLimited,
    Blocked(u16),
    HttpStatus(u16),
    TlsError(String),
    BadPayload(String),
    MalformedRecord(String),
    FareLookupFailed { train_no: String, attempts: u32 },
    UnknownStation(String),
    InvalidDate(String),
    Validation(String),
    Cache(String),
}

impl fmt::Display for RailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(
                f,
                "request timed out — 12306 may be slow or unreachable. \
                 Try increasing --timeout or check your connection"
            ),
            Self::ConnectionFailed(detail) => write!(
                f,
                "connection failed — check your internet connection ({detail})"
            ),
            Self::DnsResolution(host) => write!(
                f,
                "DNS resolution failed for {host} — check your internet connection"
            ),
            Self::ProxyError(detail) => write!(
                f,
                "proxy error — check your --proxy URL is correct ({detail})"
            ),
            Self::RateLimited => write!(
                f,
                "rate limited by 12306 (HTTP 429) — wait a few minutes before retrying, \
                 or raise --delay to slow down consecutive requests"
            ),
            Self::Blocked(status) => write!(
                f,
                "request blocked by 12306 (HTTP {status}) — this usually means \
                 rate limiting or bot detection. Try again later or raise --delay"
            ),
            Self::HttpStatus(status) => write!(
                f,
                "unexpected HTTP status {status} from 12306"
            ),
            Self::TlsError(detail) => write!(
                f,
                "TLS/SSL error — connection to 12306 failed ({detail})"
            ),
            Self::BadPayload(detail) => write!(
                f,
                "failed to parse 12306 response — {detail}. \
                 This may indicate an upstream API format change"
            ),
            Self::MalformedRecord(detail) => write!(
                f,
                "malformed ticket record — {detail}. \
                 This may indicate an upstream API format change"
            ),
            Self::FareLookupFailed { train_no, attempts } => write!(
                f,
                "fare lookup for train {train_no} failed after {attempts} attempts — \
                 12306 throttles the price endpoint aggressively; retry later or use --no-prices"
            ),
            Self::UnknownStation(name) => write!(
                f,
                "unknown station \"{name}\" — use the Chinese name (e.g. 北京), \
                 the full romanization (beijing), or its short form (bj)"
            ),
            Self::InvalidDate(date) => write!(
                f,
                "invalid travel date \"{date}\" — must be YYYY-MM-DD and not in the past \
                 (e.g. 2026-09-01)"
            ),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Cache(detail) => write!(f, "station cache error — {detail}"),
        }
    }
}

impl std::error::Error for RailError {}

pub fn from_http_error(err: wreq::Error) -> RailError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return RailError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return RailError::DnsResolution(msg);
        }
        return RailError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return RailError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return RailError::TlsError(msg);
    }

    if lower.contains("builder error") && lower.contains("uri") {
        return RailError::ProxyError(msg);
    }

    RailError::ConnectionFailed(msg)
}
