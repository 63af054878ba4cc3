mod discard;
mod exec;
mod multi;

pub use discard::discard;
pub use exec::exec;
pub use multi::multi;
