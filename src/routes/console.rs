use super::RouteNode;

/// Privilege identifiers granted by the identity provider.
///
/// The console only compares them for equality; their meaning is owned by the backend.
pub mod privileges {
    pub const VIEW_ORDER: &str = "ViewOrder";
    pub const CREATE_ORDER: &str = "CreateOrder";
    pub const EDIT_ORDER: &str = "EditOrder";

    pub const VIEW_PROJECT: &str = "ViewProject";
    pub const CREATE_PROJECT: &str = "CreateProject";
    pub const EDIT_PROJECT: &str = "EditProject";

    pub const VIEW_VENDOR: &str = "ViewVendor";
    pub const CREATE_VENDOR: &str = "CreateVendor";
    pub const EDIT_VENDOR: &str = "EditVendor";

    pub const VIEW_TRANSLATION_MEMORY: &str = "ViewTranslationMemory";
    pub const IMPORT_TRANSLATION_MEMORY: &str = "ImportTranslationMemory";

    pub const VIEW_USER: &str = "ViewUser";
    pub const MANAGE_USERS: &str = "ManageUsers";
    pub const MANAGE_ROLES: &str = "ManageRoles";
}

use privileges::*;

/// Path every denied navigation is sent back to.
pub const ROOT_PATH: &str = "/";

/// console_routes
///
/// The console's route declaration, evaluated once at startup by `build_index`.
///
/// Requirements are declared per node and never inherited. Container routes such as
/// `/admin` carry no requirement; each screen below them lists the privileges that open it.
pub fn console_routes() -> Vec<RouteNode> {
    vec![
        // GET /
        // Dashboard. Public so a denied navigation always has somewhere to land.
        RouteNode::new(ROOT_PATH),
        // Orders
        RouteNode::new("/orders").requires([VIEW_ORDER]).children([
            RouteNode::new("new").requires([CREATE_ORDER]),
            RouteNode::new(":orderId")
                .requires([VIEW_ORDER])
                .child(RouteNode::new("edit").requires([EDIT_ORDER])),
        ]),
        // Projects
        RouteNode::new("/projects").requires([VIEW_PROJECT]).children([
            RouteNode::new("new").requires([CREATE_PROJECT]),
            RouteNode::new(":projectId")
                .requires([VIEW_PROJECT])
                .child(RouteNode::new("edit").requires([EDIT_PROJECT])),
        ]),
        // Vendors
        RouteNode::new("/vendors").requires([VIEW_VENDOR]).children([
            RouteNode::new("new").requires([CREATE_VENDOR]),
            RouteNode::new(":vendorId")
                .requires([VIEW_VENDOR])
                .child(RouteNode::new("edit").requires([EDIT_VENDOR])),
        ]),
        // Translation memories
        RouteNode::new("/translation-memories")
            .requires([VIEW_TRANSLATION_MEMORY])
            .children([
                RouteNode::new("import").requires([IMPORT_TRANSLATION_MEMORY]),
                RouteNode::new(":memoryId").requires([VIEW_TRANSLATION_MEMORY]),
            ]),
        // User and role management
        RouteNode::new("/admin").children([
            RouteNode::new("users")
                .requires([VIEW_USER, MANAGE_USERS])
                .child(RouteNode::new(":userId").requires([VIEW_USER, MANAGE_USERS])),
            RouteNode::new("roles")
                .requires([MANAGE_ROLES])
                .child(RouteNode::new(":roleId").requires([MANAGE_ROLES])),
        ]),
        // Own profile, available to every signed-in user.
        RouteNode::new("/settings/profile"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::build_index;

    #[test]
    fn console_routes_build_without_errors() {
        let index = build_index(&console_routes()).expect("console routes must be well formed");
        assert!(index.get("/vendors/:vendorId/edit").is_some());
        assert!(index.get("/admin/roles/:roleId").is_some());
    }

    #[test]
    fn admin_container_is_public() {
        let index = build_index(&console_routes()).unwrap();
        assert_eq!(index.get("/admin").map(|p| p.is_empty()), Some(true));
    }
}
