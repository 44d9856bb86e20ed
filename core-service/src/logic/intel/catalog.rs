//! Built-in Port Catalog
//!
//! Well-known exposures with reference CVSS, exploitability and example
//! vulnerability identifiers. Service names follow the scanner's
//! service-detection names so `(port, service)` pairs match scan output.

use super::types::{PortRecord, Rating, RiskTier};

use Rating as R;
use RiskTier as T;

type Row = (u16, &'static str, &'static str, T, f64, R, R, &'static [&'static str]);

// (port, service, label, tier, cvss, exploitability, mitigation priority, ids)
const BUILTIN: &[Row] = &[
    // === File transfer / remote shells ===
    (20, "ftp-data", "FTP-DATA", T::Critical, 7.5, R::High, R::Critical, &["CVE-2014-0038"]),
    (21, "ftp", "FTP", T::Critical, 8.1, R::High, R::Critical, &["CVE-2010-4217"]),
    (22, "ssh", "SSH", T::Medium, 5.3, R::Medium, R::High, &["CVE-2018-15473"]),
    (23, "telnet", "Telnet", T::Critical, 9.8, R::High, R::Critical, &["CVE-2011-4862"]),
    (512, "exec", "rexec", T::High, 7.5, R::High, R::High, &["CVE-1999-0618"]),
    (513, "login", "rlogin", T::High, 7.5, R::High, R::High, &["CVE-1999-0651"]),
    (514, "shell", "rsh", T::High, 7.5, R::High, R::High, &["CVE-1999-0651"]),

    // === Mail ===
    (25, "smtp", "SMTP", T::High, 6.8, R::Medium, R::High, &["CVE-2019-9670"]),
    (110, "pop3", "POP3", T::Medium, 5.0, R::Medium, R::Medium, &[]),
    (143, "imap", "IMAP", T::Medium, 5.0, R::Medium, R::Medium, &[]),
    (465, "smtps", "SMTPS", T::Medium, 5.3, R::Medium, R::Medium, &["CVE-2019-4310"]),
    (587, "submission", "SMTP Submission", T::Medium, 5.3, R::Medium, R::Medium, &[]),
    (993, "imaps", "IMAPS", T::Low, 4.3, R::Low, R::Medium, &[]),
    (995, "pop3s", "POP3S", T::Low, 4.3, R::Low, R::Medium, &[]),

    // === Infrastructure ===
    (53, "domain", "DNS", T::Medium, 7.5, R::High, R::High, &["CVE-2019-6471"]),
    (88, "kerberos-sec", "Kerberos", T::Medium, 6.5, R::Medium, R::High, &["CVE-2014-9467"]),
    (111, "rpcbind", "RPCBind", T::High, 7.5, R::High, R::High, &["CVE-2017-8779"]),
    (123, "ntp", "NTP", T::Medium, 5.0, R::Medium, R::Medium, &["CVE-2013-5211"]),
    (161, "snmp", "SNMP", T::High, 7.5, R::High, R::High, &["CVE-2017-6736"]),
    (389, "ldap", "LDAP", T::Medium, 6.5, R::Medium, R::High, &["CVE-2017-8563"]),
    (636, "ldapssl", "LDAPS", T::Low, 4.3, R::Low, R::Medium, &[]),
    (2049, "nfs", "NFS", T::High, 7.5, R::High, R::High, &["CVE-2018-1160"]),

    // === Windows ===
    (135, "msrpc", "RPC", T::High, 7.8, R::High, R::Critical, &["CVE-2017-0143", "CVE-2003-0109"]),
    (139, "netbios-ssn", "NetBIOS", T::High, 7.5, R::High, R::High, &["CVE-2017-0143"]),
    (445, "microsoft-ds", "SMB", T::Critical, 9.8, R::Critical, R::Critical, &["CVE-2017-0144", "CVE-2020-0796"]),
    (3389, "ms-wbt-server", "RDP", T::Critical, 8.8, R::High, R::Critical, &["CVE-2019-0708", "CVE-2020-0609"]),
    (5985, "wsman", "WinRM", T::High, 7.5, R::Medium, R::High, &[]),

    // === Web ===
    (80, "http", "HTTP", T::Medium, 8.6, R::High, R::Critical, &["CVE-2016-10033"]),
    (443, "https", "HTTPS", T::Low, 5.9, R::Medium, R::High, &["CVE-2016-2183"]),
    (5000, "upnp", "Flask/UPnP", T::Medium, 6.8, R::High, R::High, &["CVE-2015-3337"]),
    (8080, "http-proxy", "HTTP Proxy", T::Medium, 6.5, R::Medium, R::High, &["CVE-2019-1010022"]),
    (8080, "http", "HTTP Alt", T::Medium, 6.5, R::Medium, R::High, &["CVE-2019-1010022"]),
    (8443, "https-alt", "HTTPS Alt", T::Low, 5.9, R::Medium, R::Medium, &[]),
    (9090, "zeus-admin", "Admin Console", T::Medium, 7.5, R::Medium, R::High, &["CVE-2017-6090"]),

    // === Databases and caches ===
    (1433, "ms-sql-s", "MSSQL", T::Critical, 8.9, R::High, R::Critical, &["CVE-2019-0604"]),
    (1521, "oracle", "Oracle DB", T::High, 7.5, R::High, R::High, &["CVE-2012-1675"]),
    (3306, "mysql", "MySQL", T::Critical, 8.6, R::High, R::Critical, &["CVE-2019-2626"]),
    (5432, "postgresql", "PostgreSQL", T::Critical, 8.4, R::High, R::Critical, &["CVE-2019-9193"]),
    (6379, "redis", "Redis", T::Critical, 9.8, R::Critical, R::Critical, &["CVE-2015-4335"]),
    (9200, "elasticsearch", "Elasticsearch", T::Critical, 9.8, R::Critical, R::Critical, &["CVE-2014-3120"]),
    (11211, "memcache", "Memcached", T::High, 7.5, R::High, R::High, &["CVE-2018-1000115"]),
    (27017, "mongodb", "MongoDB", T::Critical, 9.8, R::Critical, R::Critical, &["CVE-2014-3971"]),

    // === Remote desktop / orchestration ===
    (2375, "docker", "Docker API", T::Critical, 9.8, R::Critical, R::Critical, &["CVE-2019-5736"]),
    (5037, "adb", "Android Debug Bridge", T::Critical, 9.8, R::Critical, R::Critical, &["CVE-2017-9822"]),
    (5900, "vnc", "VNC", T::High, 9.8, R::High, R::High, &["CVE-2019-15690"]),
    (6000, "x11", "X11", T::High, 6.6, R::Medium, R::High, &["CVE-2014-0209"]),
    (6443, "sun-sr-https", "Kubernetes API", T::High, 8.8, R::High, R::Critical, &["CVE-2018-1002105"]),
];

/// Records shipped with the crate
pub fn builtin_records() -> Vec<PortRecord> {
    BUILTIN
        .iter()
        .map(
            |&(port, service, label, tier, cvss, exploitability, mitigation_priority, ids)| {
                PortRecord {
                    port,
                    service: service.to_string(),
                    label: label.to_string(),
                    tier,
                    cvss,
                    exploitability,
                    mitigation_priority,
                    vulnerability_ids: ids.iter().map(|s| s.to_string()).collect(),
                }
            },
        )
        .collect()
}
