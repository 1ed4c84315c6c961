pub mod group_by_field_id;
pub mod input;
pub mod name_url_pairer;

mod ext;
mod policy;

pub use {
    ext::ObjectWorkersExt,
    group_by_field_id::group_by_field_id,
    name_url_pairer::{Pairing, pair_names_with_urls, pairings_to_value},
    policy::{ParsePolicyError, Policy},
};
