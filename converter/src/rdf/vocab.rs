//! Vocabulary IRIs used by the conversion engine.

/// CSV on the Web vocabulary.
pub mod csvw {
    pub const NS: &str = "http://www.w3.org/ns/csvw#";

    pub const TABLE_GROUP: &str = "http://www.w3.org/ns/csvw#TableGroup";
    pub const TABLE: &str = "http://www.w3.org/ns/csvw#Table";
    pub const ROW: &str = "http://www.w3.org/ns/csvw#Row";

    pub const HAS_TABLE: &str = "http://www.w3.org/ns/csvw#table";
    pub const HAS_URL: &str = "http://www.w3.org/ns/csvw#url";
    pub const HAS_ROW: &str = "http://www.w3.org/ns/csvw#row";
    pub const HAS_ROW_NUMBER: &str = "http://www.w3.org/ns/csvw#rownum";
    pub const DESCRIBES: &str = "http://www.w3.org/ns/csvw#describes";
}

/// RDF core vocabulary.
pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// XML Schema datatypes.
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}
