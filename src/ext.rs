use {
    crate::{
        Policy, group_by_field_id,
        name_url_pairer::{self, Pairing},
    },
    serde_json::{Map, Value},
};

#[extension_traits::extension(pub trait ObjectWorkersExt)]
impl Value {
    /// See [`group_by_field_id::group_by_field_id`].
    fn group_by_field_id(self, policy: Policy) -> group_by_field_id::Result<Map<String, Value>> {
        group_by_field_id::group_by_field_id(self, policy)
    }

    /// See [`name_url_pairer::pair_names_with_urls`].
    fn pair_names_with_urls(&self, policy: Policy) -> name_url_pairer::Result<Vec<Pairing>> {
        name_url_pairer::pair_names_with_urls(self, policy)
    }
}
