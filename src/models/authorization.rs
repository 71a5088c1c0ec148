use super::write_identity;
use modelkit::attrs::{object, scalar, set};
use modelkit::{
    Collector, Document, Handler, Matchable, Model, Modifier, StringValue, TriStateList,
    TriStateSet, Validator, match_list, validate,
};
use serde::{Deserialize, Serialize};

pub const PERMISSION_NAMESPACE: &str = "permission";
pub const ROLE_NAMESPACE: &str = "role";

/// Role-based access control definitions
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Authorization {
    pub permissions: TriStateList<Permission>,
    pub roles: TriStateList<Role>,
}

impl Model for Authorization {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        object::get_list(&self.permissions, &mut data, "permissions", h);
        object::get_list(&self.roles, &mut data, "roles", h);
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        object::set_list(&mut self.permissions, data, "permissions", h);
        object::set_list(&mut self.roles, data, "roles", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for Authorization {
    fn validate(&self, h: &mut Handler) {
        validate::unique_items(h, "permission", &self.permissions);
        validate::unique_items(h, "role", &self.roles);
        object::validate_list(&self.permissions, h);
        object::validate_list(&self.roles, h);
    }
}

impl Collector for Authorization {
    fn collect_references(&self, h: &mut Handler) {
        object::collect_list(&self.permissions, h);
        object::collect_list(&self.roles, h);
    }
}

impl Modifier for Authorization {
    fn match_identities(&mut self, prior: &Self) {
        let permissions = match_list(&mut self.permissions, &prior.permissions);
        let roles = match_list(&mut self.roles, &prior.roles);
        log::debug!("authorization: permissions {permissions:?}, roles {roles:?}");
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Permission {
    pub id: StringValue,
    pub name: StringValue,
    pub description: StringValue,
}

impl Model for Permission {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        write_identity(h, &mut data, PERMISSION_NAMESPACE, self.name.value_str());
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.description, &mut data, "description");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set(&mut self.name, data, "name", h);
        scalar::set(&mut self.description, data, "description", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for Permission {
    fn validate(&self, h: &mut Handler) {
        if !self.name.is_present() {
            h.missing("Missing attribute 'name' in permission", "");
        }
    }
}

impl Collector for Permission {
    fn collect_references(&self, h: &mut Handler) {
        if let Some(name) = self.name.as_present() {
            h.refs.add(PERMISSION_NAMESPACE, "", self.id.value_str(), name);
        }
    }
}

impl Matchable for Permission {
    fn name(&self) -> &StringValue {
        &self.name
    }

    fn id(&self) -> &StringValue {
        &self.id
    }

    fn set_id(&mut self, id: StringValue) {
        self.id = id;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Role {
    pub id: StringValue,
    pub name: StringValue,
    pub description: StringValue,
    /// Names of permissions granted by this role
    pub permissions: TriStateSet<String>,
}

impl Model for Role {
    fn values(&self, h: &mut Handler) -> Document {
        let mut data = Document::new();
        write_identity(h, &mut data, ROLE_NAMESPACE, self.name.value_str());
        scalar::get(&self.name, &mut data, "name");
        scalar::get(&self.description, &mut data, "description");
        set::get(&self.permissions, &mut data, "permissionNames");
        data
    }

    fn set_values(&mut self, h: &mut Handler, data: &Document) {
        scalar::set(&mut self.id, data, "id", h);
        scalar::set(&mut self.name, data, "name", h);
        scalar::set(&mut self.description, data, "description", h);
        set::set(&mut self.permissions, data, "permissionNames", h);
    }

    fn validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }

    fn collector(&self) -> Option<&dyn Collector> {
        Some(self)
    }
}

impl Validator for Role {
    fn validate(&self, h: &mut Handler) {
        if !self.name.is_present() {
            h.missing("Missing attribute 'name' in role", "");
        }
        // permissions are registered before any validation runs
        for permission in self.permissions.as_present().into_iter().flatten() {
            h.resolve(PERMISSION_NAMESPACE, permission);
        }
    }
}

impl Collector for Role {
    fn collect_references(&self, h: &mut Handler) {
        if let Some(name) = self.name.as_present() {
            h.refs.add(ROLE_NAMESPACE, "", self.id.value_str(), name);
        }
    }
}

impl Matchable for Role {
    fn name(&self) -> &StringValue {
        &self.name
    }

    fn id(&self) -> &StringValue {
        &self.id
    }

    fn set_id(&mut self, id: StringValue) {
        self.id = id;
    }
}
