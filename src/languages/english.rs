use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    pub(super) static ref STRINGS: HashMap<&'static str, &'static str> = HashMap::from([
        ("ERROR_GENERIC", "Something went wrong running that command!"),
        ("MISSING_MEMBER", "I couldn't find that member!"),
        ("PING_RESPONSE", "pong"),
    ]);
}
