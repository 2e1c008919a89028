//! Shared fixtures for the workspace integration tests.

/// An admission message with repetitions, escapes and a null value.
pub const ADT_A01: &str = "MSH|^~\\&|SENDAPP|SENDFAC|RECVAPP|RECVFAC|20230101120000||ADT^A01^ADT_A01|MSG00001|P|2.5\r\
EVN|A01|20230101120000\r\
PID|1||123456^^^HOSP^MR~987^^^SSA^SS||Doe^Jane^Q^^Dr||19800101|F|||1 Main St^^Town^ST^12345||555\\F\\0100|||||\"\"\r\
NK1|1|Doe^John|SPO\r\
NK1|2|Doe^Baby|CHD\r\
PV1|1|I|WARD^101^A\r";

/// A lab result with a formatted-text observation.
pub const ORU_R01: &str = "MSH|^~\\&|LAB|HOSP|EMR|HOSP|20230102083000||ORU^R01|LAB777|P|2.5.1\r\
PID|1||123456^^^HOSP^MR||Doe^Jane\r\
OBR|1||ORD1|GLU^Glucose\r\
OBX|1|NM|GLU^Glucose||95|mg/dL|70-99||||F\r\
OBX|2|FT|NOTE||fasting\\.br\\sample \\H\\ok\\N\\||||||F\r";

/// The minimal message from the round-trip example.
pub const MINIMAL: &str = "MSH|^~\\&|A|B|C|D|20230101||ADT^A01|1|P|2.5\r";
