//! Accessory descriptors registered by platforms

use mambo_core::{Characteristic, Device, DeviceId, ServiceKind, SurfaceId, SurfaceRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value range a controllable characteristic accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicProps {
    pub min_value: f64,
    pub max_value: f64,
    pub min_step: f64,
}

/// One typed surface of an accessory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub surface_id: SurfaceId,
    pub kind: ServiceKind,
    pub name: String,
    #[serde(default)]
    pub props: HashMap<Characteristic, CharacteristicProps>,
}

/// A virtual device exposed to the host, made of several surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub device: Device,
    services: Vec<ServiceDescriptor>,
}

impl Accessory {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            services: Vec::new(),
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device.id
    }

    pub fn display_name(&self) -> &str {
        &self.device.name
    }

    /// Add a surface for `role`; a role already present is replaced
    pub fn add_service(&mut self, role: SurfaceRole, name: impl Into<String>) -> &mut ServiceDescriptor {
        self.services.retain(|s| s.surface_id.role() != role);
        self.services.push(ServiceDescriptor {
            surface_id: SurfaceId::new(self.device.id.clone(), role),
            kind: role.kind(),
            name: name.into(),
            props: HashMap::new(),
        });
        let last = self.services.len() - 1;
        &mut self.services[last]
    }

    pub fn service(&self, role: SurfaceRole) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.surface_id.role() == role)
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn surface_id(&self, role: SurfaceRole) -> SurfaceId {
        SurfaceId::new(self.device.id.clone(), role)
    }
}

impl ServiceDescriptor {
    pub fn set_props(&mut self, characteristic: Characteristic, props: CharacteristicProps) -> &mut Self {
        self.props.insert(characteristic, props);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_service_replaces_same_role() {
        let mut accessory = Accessory::new(Device::new("d1", "Kitchen"));
        accessory.add_service(SurfaceRole::EditRecipe, "Edit Recipe");
        accessory.add_service(SurfaceRole::EditRecipe, "Edit Recipe (again)");
        accessory.add_service(SurfaceRole::Humidity, "Humidity");

        assert_eq!(accessory.services().len(), 2);
        let edit = accessory.service(SurfaceRole::EditRecipe).unwrap();
        assert_eq!(edit.name, "Edit Recipe (again)");
        assert_eq!(edit.kind, ServiceKind::Switch);
        assert_eq!(edit.surface_id.to_string(), "d1/edit_recipe");
    }

    #[test]
    fn test_props() {
        let mut accessory = Accessory::new(Device::new("d1", "Kitchen"));
        accessory.add_service(SurfaceRole::Recipes, "Recipes").set_props(
            Characteristic::RotationSpeed,
            CharacteristicProps {
                min_value: 0.0,
                max_value: 2.0,
                min_step: 1.0,
            },
        );

        let recipes = accessory.service(SurfaceRole::Recipes).unwrap();
        assert_eq!(recipes.props[&Characteristic::RotationSpeed].max_value, 2.0);
    }
}
