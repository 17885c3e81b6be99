/// Route component constants shared across crates
pub const WELL_KNOWN_ROUTE_COMPONENT: &str = ".well-known";
pub const WHOAMI_ROUTE_COMPONENT: &str = "whoami";
pub const WHOAMI_ROUTE_PREFIX: &str =
    const_str::concat!("/", WELL_KNOWN_ROUTE_COMPONENT, "/", WHOAMI_ROUTE_COMPONENT);

/// Default suffix appended to a resource identifier to find its ACL document.
pub const DEFAULT_ACL_SUFFIX: &str = ".acl";

/// Response header carrying the authenticated `WebID`.
pub const USER_HEADER: &str = "User";

pub const TURTLE_CONTENT_TYPE: &str = "text/turtle";

/// Web Access Control vocabulary.
pub mod acl {
    pub const NS: &str = "http://www.w3.org/ns/auth/acl#";

    pub const AUTHORIZATION: &str = const_str::concat!(NS, "Authorization");
    pub const ACCESS_TO: &str = const_str::concat!(NS, "accessTo");
    pub const DEFAULT_FOR_NEW: &str = const_str::concat!(NS, "defaultForNew");
    pub const DEFAULT: &str = const_str::concat!(NS, "default");
    pub const AGENT: &str = const_str::concat!(NS, "agent");
    pub const AGENT_CLASS: &str = const_str::concat!(NS, "agentClass");
    pub const AGENT_GROUP: &str = const_str::concat!(NS, "agentGroup");
    pub const ORIGIN: &str = const_str::concat!(NS, "origin");
    pub const MODE: &str = const_str::concat!(NS, "mode");
    pub const OWNER: &str = const_str::concat!(NS, "owner");
    pub const AUTHENTICATED_AGENT: &str = const_str::concat!(NS, "AuthenticatedAgent");

    pub const READ: &str = const_str::concat!(NS, "Read");
    pub const APPEND: &str = const_str::concat!(NS, "Append");
    pub const WRITE: &str = const_str::concat!(NS, "Write");
    pub const CONTROL: &str = const_str::concat!(NS, "Control");
}

/// Friend-of-a-friend vocabulary.
pub mod foaf {
    pub const NS: &str = "http://xmlns.com/foaf/0.1/";

    /// The public agent class: matches every requester.
    pub const AGENT: &str = const_str::concat!(NS, "Agent");
    pub const GROUP: &str = const_str::concat!(NS, "Group");
    pub const MEMBER: &str = const_str::concat!(NS, "member");
}

pub mod vcard {
    pub const NS: &str = "http://www.w3.org/2006/vcard/ns#";

    pub const HAS_MEMBER: &str = const_str::concat!(NS, "hasMember");
}

/// Certificate ontology used by `WebID` profiles to publish key material.
pub mod cert {
    pub const NS: &str = "http://www.w3.org/ns/auth/cert#";

    pub const KEY: &str = const_str::concat!(NS, "key");
    pub const IDENTITY: &str = const_str::concat!(NS, "identity");
    pub const MODULUS: &str = const_str::concat!(NS, "modulus");
    pub const EXPONENT: &str = const_str::concat!(NS, "exponent");
    pub const RSA_PUBLIC_KEY: &str = const_str::concat!(NS, "RSAPublicKey");
}

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    pub const TYPE: &str = const_str::concat!(NS, "type");
    pub const LANG_STRING: &str = const_str::concat!(NS, "langString");
    pub const FIRST: &str = const_str::concat!(NS, "first");
    pub const REST: &str = const_str::concat!(NS, "rest");
    pub const NIL: &str = const_str::concat!(NS, "nil");
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const STRING: &str = const_str::concat!(NS, "string");
    pub const INTEGER: &str = const_str::concat!(NS, "integer");
    pub const DECIMAL: &str = const_str::concat!(NS, "decimal");
    pub const DOUBLE: &str = const_str::concat!(NS, "double");
    pub const BOOLEAN: &str = const_str::concat!(NS, "boolean");
    pub const HEX_BINARY: &str = const_str::concat!(NS, "hexBinary");
}

pub mod ldp {
    pub const NS: &str = "http://www.w3.org/ns/ldp#";

    pub const CONTAINS: &str = const_str::concat!(NS, "contains");
    pub const BASIC_CONTAINER: &str = const_str::concat!(NS, "BasicContainer");
    pub const RESOURCE: &str = const_str::concat!(NS, "Resource");
}
