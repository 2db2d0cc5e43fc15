use serde::Serialize;

///
/// ProtoFile
/// one rendered `.proto` unit, handed to the external renderer
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ProtoFile {
    pub name: String,
    pub package: String,
    pub go_package: String,
    pub imports: Vec<String>,
    pub elements: Vec<PbElement>,
}

impl ProtoFile {
    pub fn messages(&self) -> impl Iterator<Item = &PbMessage> {
        self.elements.iter().filter_map(|element| match element {
            PbElement::Message(message) => Some(message),
            PbElement::Enum(_) => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &PbEnum> {
        self.elements.iter().filter_map(|element| match element {
            PbElement::Enum(e) => Some(e),
            PbElement::Message(_) => None,
        })
    }

    #[must_use]
    pub fn message(&self, name: &str) -> Option<&PbMessage> {
        self.messages().find(|m| m.name == name)
    }

    #[must_use]
    pub fn enumeration(&self, name: &str) -> Option<&PbEnum> {
        self.enums().find(|e| e.name == name)
    }
}

///
/// PbElement
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PbElement {
    Enum(PbEnum),
    Message(PbMessage),
}

///
/// PbMessage
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PbMessage {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    pub fields: Vec<PbField>,
}

impl PbMessage {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&PbField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

///
/// PbField
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PbField {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    pub tag: u32,
    pub repeated: bool,
    pub optional: bool,

    // rule body without the option name, eg. `.string.uuid = true`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rules: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

///
/// PbEnum
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PbEnum {
    pub name: String,
    pub values: Vec<PbEnumValue>,
}

///
/// PbEnumValue
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PbEnumValue {
    pub name: String,
    pub number: i32,
}
