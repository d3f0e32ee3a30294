use std::fmt;

use winnow::combinator::{opt, preceded};
use winnow::prelude::*;
use winnow::token::{literal, take_while};

/// Field names of the fixed relational schema the editor queries against.
pub const FIELD_NAMES: &[&str] = &[
    // person
    "person.id", "person.firstName", "person.lastName", "person.email", "person.birthday",
    "person.isActive", "person.isArchived", "person.isSystemUser", "person.mobile",
    "person.phonePrivate", "person.street", "person.city", "person.zip", "person.country",
    "person.sexId", "person.statusId", "person.campusId", "person.familyStatusId", "person.job",
    "person.nickname", "person.title", "person.dateOfBaptism", "person.dateOfBelonging",
    "person.dateOfEntry", "person.dateOfResign", "person.lastLogin", "person.createdDate",
    "person.modifiedDate",
    // groups
    "ctgroup.id", "ctgroup.name", "ctgroup.groupTypeId", "ctgroup.groupStatusId",
    "ctgroup.groupCategoryId", "ctgroup.autoAccept", "ctgroup.informLeader", "ctgroup.maxMembers",
    "ctgroup.allowWaitinglist", "ctgroup.visibility", "ctgroup.startDate", "ctgroup.endDate",
    "ctgroup.meetingTime", "ctgroup.weekday", "ctgroup.campusId", "ctgroup.targetGroupId",
    "ctgroup.note", "ctgroup.createdDate", "ctgroup.modifiedDate",
    // memberships
    "groupmember.id", "groupmember.groupId", "groupmember.groupMemberStatus",
    "groupmember.memberStartDate", "groupmember.memberEndDate", "groupmember.waitingListPosition",
    "groupmember.comment", "groupmember.followUpStep", "groupmember.createdDate",
    "groupmember.modifiedDate",
    "groupmemberfieldvalue.groupMemberFieldId", "groupmemberfieldvalue.value",
    "groupmemberfield.id", "groupmemberfield.groupId", "groupmemberfield.name",
    "groupmemberfield.defaultValue", "groupmemberfield.requiredInRegistrationForm",
    "groupmemberfield.useInRegistrationForm",
    // status and roles
    "status.id", "status.name", "status.isMember", "status.isSearchable", "status.shorty",
    "role.id", "role.name", "role.shorty", "role.type", "role.isDefault", "role.isHidden",
    // group types and status
    "grouptype.id", "grouptype.name", "grouptype.namePlural", "grouptype.shorty",
    "grouptype.color", "grouptype.isLeaderNecessary", "grouptype.availableForNewPerson",
    "groupstatus.id", "groupstatus.name",
    // relationships
    "relationship.id", "relationship.personAId", "relationship.personBId",
    "relationship__personA.firstName", "relationship__personA.lastName",
    "relationship__personA.email", "relationship__personB.firstName",
    "relationship__personB.lastName", "relationship__personB.email",
    "relationshiptype.id", "relationshiptype.name", "relationshiptype.degreeNameA",
    "relationshiptype.degreeNameB",
    // transactions
    "transaction.id", "transaction.amount", "transaction.documentDate",
    "transaction.documentNumber", "transaction.donatorId", "transaction.note",
    "transaction.createdDate", "transaction__donator.firstName", "transaction__donator.lastName",
    "transaction__donator.email",
    // lookups
    "language.code", "language.name", "contactlabel.name", "contactlabel.isDefault",
    "personemail.email", "personemail.isDefault",
];

pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELD_NAMES.iter().copied()
}

pub fn is_known_field(name: &str) -> bool {
    FIELD_NAMES.contains(&name)
}

/// Whether any known field lives in `table`.
pub fn is_known_table(table: &str) -> bool {
    field_names().filter_map(|f| parse_field_path(f).ok()).any(|p| p.table == table)
}

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

/// `table[__alias].column`, e.g. `relationship__personA.firstName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub table: String,
    pub alias: Option<String>,
    pub column: String,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}__{}.{}", self.table, alias, self.column),
            None => write!(f, "{}.{}", self.table, self.column),
        }
    }
}

/// Parse a dotted field reference.
pub fn parse_field_path(input: &str) -> anyhow::Result<FieldPath> {
    field_path
        .parse(input)
        .map_err(|e| anyhow::anyhow!("invalid field path {input:?}: {e}"))
}

fn segment<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric()).parse_next(input)
}

fn field_path(input: &mut &str) -> ModalResult<FieldPath> {
    let table = segment.parse_next(input)?;
    let alias = opt(preceded(literal("__"), segment)).parse_next(input)?;
    literal(".").parse_next(input)?;
    let column = segment.parse_next(input)?;
    Ok(FieldPath {
        table: table.to_string(),
        alias: alias.map(str::to_string),
        column: column.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_path() {
        let p = parse_field_path("person.firstName").unwrap();
        assert_eq!(p.table, "person");
        assert_eq!(p.alias, None);
        assert_eq!(p.column, "firstName");
        assert_eq!(p.to_string(), "person.firstName");
    }

    #[test]
    fn parse_aliased_path() {
        let p = parse_field_path("relationship__personA.email").unwrap();
        assert_eq!(p.table, "relationship");
        assert_eq!(p.alias.as_deref(), Some("personA"));
        assert_eq!(p.column, "email");
        assert_eq!(p.to_string(), "relationship__personA.email");
    }

    #[test]
    fn reject_malformed_paths() {
        assert!(parse_field_path("person").is_err());
        assert!(parse_field_path("person.").is_err());
        assert!(parse_field_path(".age").is_err());
        assert!(parse_field_path("person.age.extra").is_err());
        assert!(parse_field_path("").is_err());
    }

    #[test]
    fn every_catalog_field_parses() {
        for name in FIELD_NAMES {
            assert!(parse_field_path(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn known_fields_and_tables() {
        assert!(is_known_field("transaction.amount"));
        assert!(!is_known_field("person.age"));
        assert!(is_known_table("person"));
        assert!(is_known_table("relationship"));
        assert!(!is_known_table("invoice"));
    }
}
