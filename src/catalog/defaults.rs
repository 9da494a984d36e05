//! Built-in resource table
//!
//! Independent resources first, then the resources that need their
//! identifiers, then singleton settings.

use super::descriptor::{AssignmentRoute, ResourceDescriptor};

pub(super) fn builtin_resources() -> Vec<ResourceDescriptor> {
    let mut resources = Vec::new();
    resources.extend(first_pass());
    resources.extend(second_pass());
    resources.extend(singletons());
    resources
}

fn first_pass() -> Vec<ResourceDescriptor> {
    let listed = |name: &str| ResourceDescriptor::independent(name, "lists").with_get("get");

    vec![
        // Users and groups
        listed("user"),
        listed("group"),
        listed("userType"),
        listed("application"),
        listed("authorizationServer"),
        listed("identityProvider"),
        // Network and security
        listed("networkZone"),
        listed("trustedOrigin"),
        listed("apiToken"),
        // Customization
        listed("customDomain"),
        ResourceDescriptor::independent("customization", "listBrands"),
        // Hooks
        listed("eventHook"),
        listed("inlineHook"),
        listed("hookKey"),
        listed("role"),
        listed("feature"),
        listed("emailDomain"),
        ResourceDescriptor::independent("template", "listSmss").with_get("getSms"),
    ]
}

fn second_pass() -> Vec<ResourceDescriptor> {
    let add_user_to_group = AssignmentRoute::new("group", "addUserToGroup", "user", "userId");
    let assign_group_to_app =
        AssignmentRoute::new("application", "assignGroupToApplication", "application", "appId");

    vec![
        // Group memberships and app assignments
        ResourceDescriptor::dependent("group", "listUsers", "group")
            .with_assignment(add_user_to_group),
        ResourceDescriptor::dependent("group", "listAssignedApplicationsFor", "group")
            .with_assignment(assign_group_to_app),
        ResourceDescriptor::dependent(
            "applicationGroups",
            "listApplicationGroupAssignments",
            "application",
        ),
        // Per-user listings
        ResourceDescriptor::dependent("user", "listAppLinks", "user"),
        ResourceDescriptor::dependent("user", "listGroups", "user"),
        ResourceDescriptor::dependent("user", "listGrants", "user"),
        ResourceDescriptor::dependent("user", "listIdentityProviders", "user"),
        ResourceDescriptor::dependent("userFactor", "listFactors", "user"),
        ResourceDescriptor::dependent("roleAssignment", "listAssignedRolesForUser", "user"),
        // Authorization servers
        ResourceDescriptor::dependent(
            "authorizationServerClaims",
            "listOAuth2Claims",
            "authorizationServer",
        ),
        ResourceDescriptor::dependent(
            "authorizationServerScopes",
            "listOAuth2Scopes",
            "authorizationServer",
        ),
        ResourceDescriptor::dependent("authorizationServerPolicies", "list", "authorizationServer"),
        ResourceDescriptor::dependent(
            "authorizationServerClients",
            "listOAuth2ClientsForAuthorizationServer",
            "authorizationServer",
        ),
        // Identity provider keys
        ResourceDescriptor::dependent("identityProvider", "listKeys", "identityProvider"),
        ResourceDescriptor::dependent("identityProvider", "listSigningKeys", "identityProvider"),
    ]
}

fn singletons() -> Vec<ResourceDescriptor> {
    [
        ("orgSetting", "gets"),
        ("orgSetting", "getOrgPreferences"),
        ("orgSetting", "getOktaCommunicationSettings"),
        ("orgSetting", "getOrgOktaSupportSettings"),
        ("orgSetting", "getThirdPartyAdminSetting"),
        ("orgSetting", "getWellknownOrgMetadata"),
        ("attackProtection", "getUserLockoutSettings"),
        ("attackProtection", "getAuthenticatorSettings"),
        ("threatInsight", "getCurrentConfiguration"),
        ("rateLimitSettings", "getPerClient"),
        ("rateLimitSettings", "getWarningThreshold"),
        ("rateLimitSettings", "getAdminNotifications"),
    ]
    .into_iter()
    .map(|(name, command)| ResourceDescriptor::singleton(name, command))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_assignments_are_routed() {
        let resources = second_pass();
        let members = resources
            .iter()
            .find(|r| r.name == "group" && r.list_command == "listUsers")
            .unwrap();
        let route = members.assignment.as_ref().unwrap();
        assert_eq!(route.command, "addUserToGroup");
        assert_eq!(route.member_type, "user");
        assert_eq!(members.parameter_flag(), "groupId");
    }

    #[test]
    fn test_application_groups_keyed_by_app() {
        let resources = second_pass();
        let assignments = resources
            .iter()
            .find(|r| r.name == "applicationGroups")
            .unwrap();
        assert_eq!(assignments.source_type.as_deref(), Some("application"));
        assert_eq!(assignments.parameter_flag(), "appId");
    }

    #[test]
    fn test_singleton_count() {
        assert_eq!(singletons().len(), 12);
    }
}
