//! Convenience macros for building roles and permissions.

/// Macro for creating multiple permissions from `action:resource:scope` style triples.
///
/// # Examples
///
/// ```rust
/// use role_comparison::permissions;
///
/// let perms = permissions![
///     "read" => "user" => "department",
///     "write" => "user" => "department",
///     "read" => "payroll" => "property",
/// ];
/// assert_eq!(perms.len(), 3);
/// assert_eq!(perms[2].resource(), "payroll");
/// ```
#[macro_export]
macro_rules! permissions {
    ($($action:expr => $resource:expr => $scope:expr),* $(,)?) => {
        vec![$(
            $crate::permission::Permission::new($resource, $action, $scope)
        ),*]
    };
}

/// Macro for creating a role with permissions in a single expression.
///
/// # Examples
///
/// ```rust
/// use role_comparison::role_with_permissions;
///
/// let role = role_with_permissions! {
///     id: "front-desk",
///     name: "Front Desk",
///     permissions: [
///         "read" => "user" => "department",
///         "read" => "room" => "property",
///     ]
/// };
/// assert_eq!(role.id(), "front-desk");
/// assert_eq!(role.permissions().len(), 2);
/// ```
#[macro_export]
macro_rules! role_with_permissions {
    (
        id: $id:expr,
        name: $name:expr,
        permissions: [
            $($action:expr => $resource:expr => $scope:expr),* $(,)?
        ]
    ) => {
        $crate::role::Role::with_id($id, $name)
            .add_permissions($crate::permissions![$($action => $resource => $scope),*])
    };
    (
        name: $name:expr,
        permissions: [
            $($action:expr => $resource:expr => $scope:expr),* $(,)?
        ]
    ) => {
        $crate::role::Role::new($name)
            .add_permissions($crate::permissions![$($action => $resource => $scope),*])
    };
}
