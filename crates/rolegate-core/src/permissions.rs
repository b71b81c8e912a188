//! Permission names checked by the HTTP surface

pub const GET_USER: &str = "getUser";
pub const DELETE_USER: &str = "deleteUser";
pub const UPDATE_USER: &str = "updateUser";
pub const UPDATE_ROLE: &str = "updateRol";
pub const ADD_ROLE: &str = "addRol";
pub const DELETE_ROLE: &str = "deleteRol";
pub const ADD_PERMISSION: &str = "addPermission";
pub const DELETE_PERMISSION: &str = "deletePermission";

/// Every permission a protected route can require
pub const ALL: &[&str] = &[
    GET_USER,
    DELETE_USER,
    UPDATE_USER,
    UPDATE_ROLE,
    ADD_ROLE,
    DELETE_ROLE,
    ADD_PERMISSION,
    DELETE_PERMISSION,
];
