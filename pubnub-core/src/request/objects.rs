use super::{finish, Method, QueryParams, Scratch, SigningContext};
use crate::error::PubNubError;
use alloc::string::String;

/// Which Objects-API collection a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectsCollection {
    Uuids,
    Channels,
}

impl ObjectsCollection {
    fn segment(self) -> &'static str {
        match self {
            ObjectsCollection::Uuids => "uuids",
            ObjectsCollection::Channels => "channels",
        }
    }
}

pub struct ObjectsParams<'a> {
    pub subscribe_key: &'a str,
    pub collection: ObjectsCollection,
    /// `Some(id)` targets a single object; `None` targets the collection
    /// (list/create).
    pub id: Option<&'a str>,
    pub method: Method,
    pub include: Option<&'a str>,
    pub auth: Option<&'a str>,
}

/// `/v2/objects/{sk}/uuids[/...]` or `/channels[/...]`, method-dependent
/// (GET/POST/PATCH/DELETE).
pub fn build_objects(
    scratch: &mut Scratch<'_>,
    p: &ObjectsParams<'_>,
    signing: Option<&SigningContext<'_>>,
) -> Result<(), PubNubError> {
    let mut path = String::new();
    path.push_str("/v2/objects/");
    path.push_str(p.subscribe_key);
    path.push('/');
    path.push_str(p.collection.segment());
    if let Some(id) = p.id {
        path.push('/');
        path.push_str(id);
    }

    let mut q = QueryParams::new();
    q.push_opt("include", p.include);
    q.push_opt("auth", p.auth);
    finish(scratch, &path, q, signing)
}
