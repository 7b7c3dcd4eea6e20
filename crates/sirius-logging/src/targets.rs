//! Tracing targets with their own log file.

pub const T_SAP: &str = "sap";
pub const T_DFS: &str = "dfs";
pub const T_ACS: &str = "acs";
pub const T_CSR: &str = "csr";

/// Every subsystem target, paired with its file name
pub const SUBSYSTEMS: [(&str, &str); 4] = [
    (T_SAP, "sap.log"),
    (T_DFS, "dfs.log"),
    (T_ACS, "acs.log"),
    (T_CSR, "csr.log"),
];
