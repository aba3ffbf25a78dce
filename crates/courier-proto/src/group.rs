//! Group context metadata.
//!
//! A [`GroupContext`] rides along with a message to make it a group message.
//! Its [`GroupType`] says what the message does to the group:
//!
//! - `Update`: create the group or change its title, membership, avatar,
//!   owner or admins
//! - `Deliver`: deliver an ordinary message to an existing group
//! - `Quit`: the sender leaves the group
//! - `RequestInfo`: ask a member to resend the group state
//!
//! # Presence
//!
//! Every optional field keeps the difference between "absent" and "present but
//! empty". An update carrying `members = Some(vec![])` clears the member list,
//! one with `members = None` leaves it alone, and the encoding layer has to
//! tell the two apart.

use std::fmt;

use bytes::Bytes;
use serde::Deserialize;
use serde_repr::Serialize_repr;
use tracing::{debug, trace};

use crate::{attachment::Attachment, errors::ValidationError};

/// Group operation carried by a [`GroupContext`].
///
/// Discriminants are the protocol's numeric values. Decoding goes through
/// [`GroupType::from_u8`], so numbers from newer peers become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize)]
#[serde(from = "u8")]
#[repr(u8)]
pub enum GroupType {
    /// Unrecognized operation
    Unknown = 0,
    /// Group creation or property change
    Update = 1,
    /// Message delivered to an existing group
    Deliver = 2,
    /// Sender leaves the group
    Quit = 3,
    /// Request for the current group state
    RequestInfo = 4,
}

impl GroupType {
    /// Numeric protocol value
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a numeric protocol value. Unrecognized values map to `Unknown`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Update,
            2 => Self::Deliver,
            3 => Self::Quit,
            4 => Self::RequestInfo,
            _ => Self::Unknown,
        }
    }
}

impl From<u8> for GroupType {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "UNKNOWN",
            Self::Update => "UPDATE",
            Self::Deliver => "DELIVER",
            Self::Quit => "QUIT",
            Self::RequestInfo => "REQUEST_INFO",
        };
        f.write_str(name)
    }
}

/// Group information attached to a message destined to a group.
#[derive(Debug)]
pub struct GroupContext {
    group_id: Bytes,
    group_type: GroupType,
    name: Option<String>,
    members: Option<Vec<String>>,
    avatar: Option<Attachment>,
    owner: Option<String>,
    admins: Option<Vec<String>>,
}

impl GroupContext {
    /// Context for delivering a message to an existing group.
    ///
    /// All optional fields are absent.
    pub fn deliver(group_id: impl Into<Bytes>) -> Self {
        Self::new(GroupType::Deliver, group_id, None, None, None, None, None)
    }

    /// Context with every field given explicitly.
    ///
    /// Performs no validation. Use [`GroupContext::builder`] to have the
    /// per-type rules enforced.
    pub fn new(
        group_type: GroupType,
        group_id: impl Into<Bytes>,
        name: Option<String>,
        members: Option<Vec<String>>,
        avatar: Option<Attachment>,
        owner: Option<String>,
        admins: Option<Vec<String>>,
    ) -> Self {
        Self { group_id: group_id.into(), group_type, name, members, avatar, owner, admins }
    }

    /// Builder for an UPDATE context.
    pub fn update_builder() -> GroupContextBuilder {
        GroupContextBuilder::new(GroupType::Update)
    }

    /// Builder for a context of any type.
    pub fn builder(group_type: GroupType) -> GroupContextBuilder {
        GroupContextBuilder::new(group_type)
    }

    /// Opaque group identifier
    pub fn group_id(&self) -> &Bytes {
        &self.group_id
    }

    /// Operation this context describes
    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    /// Group title
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Member identifiers, in order
    pub fn members(&self) -> Option<&[String]> {
        self.members.as_deref()
    }

    /// Group avatar
    pub fn avatar(&self) -> Option<&Attachment> {
        self.avatar.as_ref()
    }

    /// Group owner
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Admin identifiers, in order
    pub fn admins(&self) -> Option<&[String]> {
        self.admins.as_deref()
    }

    /// Move the avatar out, e.g. so the transport can upload a stream avatar.
    pub fn into_avatar(self) -> Option<Attachment> {
        self.avatar
    }
}

/// Builder for [`GroupContext`].
///
/// The group type is fixed when the builder is created. Setters can be called
/// in any order; [`build`](Self::build) is the only place rules are checked.
#[derive(Debug)]
pub struct GroupContextBuilder {
    group_type: GroupType,
    id: Option<Bytes>,
    name: Option<String>,
    members: Option<Vec<String>>,
    avatar: Option<Attachment>,
    owner: Option<String>,
    admins: Option<Vec<String>>,
}

impl GroupContextBuilder {
    fn new(group_type: GroupType) -> Self {
        Self {
            group_type,
            id: None,
            name: None,
            members: None,
            avatar: None,
            owner: None,
            admins: None,
        }
    }

    /// Group type this builder produces
    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    /// Set the group id.
    pub fn with_id(mut self, id: impl Into<Bytes>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the group title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the member list.
    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = Some(members);
        self
    }

    /// Set the avatar. Both stream and pointer attachments are accepted.
    pub fn with_avatar(mut self, avatar: impl Into<Attachment>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Set the group owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the admin list.
    pub fn with_admins(mut self, admins: Vec<String>) -> Self {
        self.admins = Some(admins);
        self
    }

    /// Validate and build the group context.
    ///
    /// # Errors
    ///
    /// - `MissingGroupId` if no id was set
    /// - `EmptyUpdate` if this is an UPDATE and none of name, members, avatar,
    ///   owner or admins was set
    pub fn build(self) -> Result<GroupContext, ValidationError> {
        let group_type = self.group_type;
        let result = self.validate();
        match &result {
            Ok(context) => {
                trace!(
                    %group_type,
                    group_id = %hex::encode(&context.group_id),
                    "built group context"
                );
            },
            Err(error) => debug!(%group_type, %error, "rejected group context"),
        }
        result
    }

    fn validate(self) -> Result<GroupContext, ValidationError> {
        let Some(group_id) = self.id else {
            return Err(ValidationError::MissingGroupId);
        };

        if self.group_type == GroupType::Update
            && self.name.is_none()
            && self.members.is_none()
            && self.avatar.is_none()
            && self.owner.is_none()
            && self.admins.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }

        Ok(GroupContext {
            group_id,
            group_type: self.group_type,
            name: self.name,
            members: self.members,
            avatar: self.avatar,
            owner: self.owner,
            admins: self.admins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AttachmentPointer;

    fn id() -> Vec<u8> {
        vec![1, 2, 3]
    }

    #[test]
    fn deliver_has_no_optional_fields() {
        let context = GroupContext::deliver(id());

        assert_eq!(context.group_type(), GroupType::Deliver);
        assert_eq!(&context.group_id()[..], &[1, 2, 3]);
        assert!(context.name().is_none());
        assert!(context.members().is_none());
        assert!(context.avatar().is_none());
        assert!(context.owner().is_none());
        assert!(context.admins().is_none());
    }

    #[test]
    fn empty_update_rejected() {
        let result = GroupContext::update_builder().with_id(id()).build();
        assert!(matches!(result, Err(ValidationError::EmptyUpdate)));
    }

    #[test]
    fn update_with_name() {
        let context =
            GroupContext::update_builder().with_id(id()).with_name("Team").build().unwrap();

        assert_eq!(context.group_type(), GroupType::Update);
        assert_eq!(context.name(), Some("Team"));
        assert!(context.members().is_none());
        assert!(context.avatar().is_none());
        assert!(context.owner().is_none());
        assert!(context.admins().is_none());
    }

    #[test]
    fn update_with_empty_members_is_a_change() {
        let context =
            GroupContext::update_builder().with_id(id()).with_members(Vec::new()).build().unwrap();

        assert_eq!(context.members(), Some(&[][..]));
    }

    #[test]
    fn update_with_pointer_avatar() {
        let avatar = AttachmentPointer::new(9, vec![0; 32], "image/png");
        let context =
            GroupContext::update_builder().with_id(id()).with_avatar(avatar).build().unwrap();

        let avatar = context.avatar().unwrap();
        assert!(avatar.is_pointer());
        assert_eq!(avatar.as_pointer().unwrap().id(), 9);
    }

    #[test]
    fn missing_id_rejected_for_every_type() {
        for group_type in [
            GroupType::Unknown,
            GroupType::Update,
            GroupType::Deliver,
            GroupType::Quit,
            GroupType::RequestInfo,
        ] {
            let result = GroupContext::builder(group_type).with_name("Team").build();
            assert!(matches!(result, Err(ValidationError::MissingGroupId)), "{group_type}");
        }
    }

    #[test]
    fn missing_id_checked_before_empty_update() {
        let result = GroupContext::update_builder().build();
        assert!(matches!(result, Err(ValidationError::MissingGroupId)));
    }

    #[test]
    fn quit_and_request_info_need_only_id() {
        for group_type in [GroupType::Quit, GroupType::RequestInfo, GroupType::Deliver] {
            let context = GroupContext::builder(group_type).with_id(id()).build().unwrap();
            assert_eq!(context.group_type(), group_type);
            assert!(context.name().is_none());
        }
    }

    #[test]
    fn empty_group_id_is_present() {
        let context = GroupContext::builder(GroupType::Quit).with_id(Vec::new()).build().unwrap();
        assert!(context.group_id().is_empty());
    }

    #[test]
    fn group_type_numeric_values() {
        assert_eq!(GroupType::Unknown.to_u8(), 0);
        assert_eq!(GroupType::Update.to_u8(), 1);
        assert_eq!(GroupType::Deliver.to_u8(), 2);
        assert_eq!(GroupType::Quit.to_u8(), 3);
        assert_eq!(GroupType::RequestInfo.to_u8(), 4);
        assert_eq!(GroupType::from_u8(200), GroupType::Unknown);
    }

    #[test]
    fn group_type_cbor_is_numeric() {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&GroupType::RequestInfo, &mut bytes).unwrap();
        assert_eq!(bytes, vec![0x04]);

        let decoded: GroupType = ciborium::de::from_reader(&[0x03_u8][..]).unwrap();
        assert_eq!(decoded, GroupType::Quit);
    }

    #[test]
    fn unrecognized_cbor_group_type_decodes_as_unknown() {
        let decoded: GroupType = ciborium::de::from_reader(&[0x07_u8][..]).unwrap();
        assert_eq!(decoded, GroupType::from_u8(7));
        assert_eq!(decoded, GroupType::Unknown);
    }

    #[test]
    fn group_type_display() {
        assert_eq!(GroupType::RequestInfo.to_string(), "REQUEST_INFO");
        assert_eq!(GroupType::Update.to_string(), "UPDATE");
    }
}
