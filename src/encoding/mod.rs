//! Encoding channels, shorthand parsing and field type inference
//!
//! Channels can be specified three equivalent ways, all serializing
//! identically:
//!
//! ```
//! use vlchart::encoding::{Encoding, EncodingChannel, FieldDef};
//! use vlchart::schema::{Channel, FieldType};
//!
//! let a = Encoding::new().x("price:Q");
//! let b = Encoding::new().channel(Channel::X, FieldDef::field("price").with_type(FieldType::Quantitative));
//! let c = Encoding::new().with(EncodingChannel::x("price:Q"));
//! assert_eq!(a.to_value(), b.to_value());
//! assert_eq!(b.to_value(), c.to_value());
//! ```

pub mod channel;
pub mod infer;
pub mod shorthand;

pub use channel::{Branch, ChannelDef, ConditionDef, ConditionTest, Encoding, EncodingChannel, FieldDef};
pub use infer::{dtype_field_type, infer_field_type};
pub use shorthand::{parse_shorthand, Shorthand};
