use std::fmt;

/// Machine-readable error codes shared by every lotdesk layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidControlInput,
    UnknownSortKey,
    InvalidFilterValue,
    ListingNotFound,
    NothingSelected,
    InvalidExportRequest,
    BackendUnreachable,
    BackendRejected,
    DecodeFailed,
    Unsupported,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidControlInput => "E2001",
            Self::UnknownSortKey => "E2002",
            Self::InvalidFilterValue => "E2003",
            Self::ListingNotFound => "E3001",
            Self::NothingSelected => "E3002",
            Self::InvalidExportRequest => "E3003",
            Self::BackendUnreachable => "E4001",
            Self::BackendRejected => "E4002",
            Self::DecodeFailed => "E4003",
            Self::Unsupported => "E4004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidControlInput => "Invalid page or rows-per-page value",
            Self::UnknownSortKey => "Unknown sort key",
            Self::InvalidFilterValue => "Invalid filter value",
            Self::ListingNotFound => "Listing not found",
            Self::NothingSelected => "No listings selected",
            Self::InvalidExportRequest => "Invalid export request",
            Self::BackendUnreachable => "Backend not reachable",
            Self::BackendRejected => "Backend rejected the request",
            Self::DecodeFailed => "Backend response could not be decoded",
            Self::Unsupported => "Operation not supported by this data source",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .lotdesk/config.toml and retry."),
            Self::InvalidControlInput => Some("Rows per page must be at least 1."),
            Self::UnknownSortKey => {
                Some("Sort by a listing field such as score, price, make or decision_status.")
            }
            Self::InvalidFilterValue => {
                Some("Status filter must be one of: scored, pending, decided, undecided.")
            }
            Self::ListingNotFound | Self::InternalUnexpected => None,
            Self::NothingSelected => Some("Select at least one listing before exporting."),
            Self::InvalidExportRequest => {
                Some("Range exports need both --start and --end with start <= end.")
            }
            Self::BackendUnreachable => {
                Some("Check LOTDESK_BACKEND_URL or use --offline for demo data.")
            }
            Self::BackendRejected => Some("Check the request and your LOTDESK_TOKEN."),
            Self::DecodeFailed => Some("Verify the backend version matches this client."),
            Self::Unsupported => Some("Connect to a live backend for this action."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 12] = [
        ErrorCode::ConfigParseError,
        ErrorCode::InvalidControlInput,
        ErrorCode::UnknownSortKey,
        ErrorCode::InvalidFilterValue,
        ErrorCode::ListingNotFound,
        ErrorCode::NothingSelected,
        ErrorCode::InvalidExportRequest,
        ErrorCode::BackendUnreachable,
        ErrorCode::BackendRejected,
        ErrorCode::DecodeFailed,
        ErrorCode::Unsupported,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_matches_code() {
        assert_eq!(ErrorCode::UnknownSortKey.to_string(), "E2002");
    }
}
