#![no_main]

use arbitrary::Arbitrary;
use courier_proto::{AttachmentPointer, GroupContext, GroupType, ValidationError};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    group_type: u8,
    id: Option<Vec<u8>>,
    name: Option<String>,
    members: Option<Vec<String>>,
    avatar: Option<(u64, Vec<u8>, String)>,
    owner: Option<String>,
    admins: Option<Vec<String>>,
}

fuzz_target!(|input: Input| {
    let group_type = GroupType::from_u8(input.group_type);
    let has_change = input.name.is_some()
        || input.members.is_some()
        || input.avatar.is_some()
        || input.owner.is_some()
        || input.admins.is_some();
    let has_id = input.id.is_some();

    let mut builder = GroupContext::builder(group_type);
    if let Some(id) = input.id.clone() {
        builder = builder.with_id(id);
    }
    if let Some(name) = input.name.clone() {
        builder = builder.with_name(name);
    }
    if let Some(members) = input.members.clone() {
        builder = builder.with_members(members);
    }
    if let Some((id, key, content_type)) = input.avatar {
        builder = builder.with_avatar(AttachmentPointer::new(id, key, content_type));
    }
    if let Some(owner) = input.owner.clone() {
        builder = builder.with_owner(owner);
    }
    if let Some(admins) = input.admins.clone() {
        builder = builder.with_admins(admins);
    }

    match builder.build() {
        Ok(context) => {
            assert!(has_id);
            assert!(group_type != GroupType::Update || has_change);
            assert_eq!(Some(context.group_id().to_vec()), input.id);
            assert_eq!(context.name(), input.name.as_deref());
            assert_eq!(context.members(), input.members.as_deref());
            assert_eq!(context.owner(), input.owner.as_deref());
            assert_eq!(context.admins(), input.admins.as_deref());
        },
        Err(ValidationError::MissingGroupId) => assert!(!has_id),
        Err(ValidationError::EmptyUpdate) => {
            assert!(has_id);
            assert_eq!(group_type, GroupType::Update);
            assert!(!has_change);
        },
        Err(other) => panic!("unexpected error: {other}"),
    }
});
