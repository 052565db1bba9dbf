//! Vehicle model shared by the unit tests.

use crate::context::ReadContext;
use crate::error::Result;
use crate::polymorphic::{read_polymorphic, write_polymorphic};
use crate::reader::{StartTag, XmlReader};
use crate::registry::TypeRegistry;
use crate::serializable::XmlSerializable;
use crate::writer::XmlWriter;
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vehicle {
    pub id: Option<String>,
    pub license_plate: String,
    pub year: i32,
    pub manufacturer: String,
    pub in_service: bool,
    pub registered_on: Option<NaiveDate>,
    pub owners: Vec<String>,
}

impl XmlSerializable for Vehicle {
    fn element_name(&self) -> &str {
        "vehicle"
    }

    fn type_name(&self) -> &str {
        "VehicleType"
    }

    fn write_attributes(&self, writer: &mut XmlWriter) -> Result<()> {
        if let Some(id) = &self.id {
            writer.write_attribute("id", id)?;
        }
        Ok(())
    }

    fn write_content(&self, writer: &mut XmlWriter) -> Result<()> {
        writer.write_text_element("licensePlate", &self.license_plate)?;
        writer.write_element("year", &self.year)?;
        writer.write_text_element("manufacturer", &self.manufacturer)?;
        writer.write_element("inService", &self.in_service)?;
        writer.write_optional("registeredOn", &self.registered_on)?;
        writer.write_elements("owner", &self.owners)
    }

    fn read_attributes(&mut self, start: &StartTag, _ctx: &ReadContext<'_>) -> Result<()> {
        self.id = start.attribute("id").map(str::to_string);
        Ok(())
    }

    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<bool> {
        match child.name() {
            "licensePlate" => self.license_plate = reader.read_text()?,
            "year" => self.year = reader.read_scalar(child, ctx)?,
            "manufacturer" => self.manufacturer = reader.read_text()?,
            "inService" => self.in_service = reader.read_scalar(child, ctx)?,
            "registeredOn" => self.registered_on = Some(reader.read_scalar(child, ctx)?),
            "owner" => self.owners.push(reader.read_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Car {
    pub vehicle: Vehicle,
    pub num_doors: i32,
    pub trunk_capacity: f64,
}

impl XmlSerializable for Car {
    fn element_name(&self) -> &str {
        "car"
    }

    fn type_name(&self) -> &str {
        "CarType"
    }

    fn write_attributes(&self, writer: &mut XmlWriter) -> Result<()> {
        self.vehicle.write_attributes(writer)
    }

    fn write_content(&self, writer: &mut XmlWriter) -> Result<()> {
        self.vehicle.write_content(writer)?;
        writer.write_element("numDoors", &self.num_doors)?;
        writer.write_element("trunkCapacity", &self.trunk_capacity)
    }

    fn read_attributes(&mut self, start: &StartTag, ctx: &ReadContext<'_>) -> Result<()> {
        self.vehicle.read_attributes(start, ctx)
    }

    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<bool> {
        match child.name() {
            "numDoors" => self.num_doors = reader.read_scalar(child, ctx)?,
            "trunkCapacity" => self.trunk_capacity = reader.read_scalar(child, ctx)?,
            _ => return self.vehicle.read_child(child, reader, ctx),
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Truck {
    pub vehicle: Vehicle,
    pub payload_capacity: f64,
    pub num_axles: i32,
}

impl XmlSerializable for Truck {
    fn element_name(&self) -> &str {
        "truck"
    }

    fn type_name(&self) -> &str {
        "TruckType"
    }

    fn write_attributes(&self, writer: &mut XmlWriter) -> Result<()> {
        self.vehicle.write_attributes(writer)
    }

    fn write_content(&self, writer: &mut XmlWriter) -> Result<()> {
        self.vehicle.write_content(writer)?;
        writer.write_element("payloadCapacity", &self.payload_capacity)?;
        writer.write_element("numAxles", &self.num_axles)
    }

    fn read_attributes(&mut self, start: &StartTag, ctx: &ReadContext<'_>) -> Result<()> {
        self.vehicle.read_attributes(start, ctx)
    }

    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<bool> {
        match child.name() {
            "payloadCapacity" => self.payload_capacity = reader.read_scalar(child, ctx)?,
            "numAxles" => self.num_axles = reader.read_scalar(child, ctx)?,
            _ => return self.vehicle.read_child(child, reader, ctx),
        }
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct Fleet {
    pub name: String,
    pub vehicles: Vec<Box<dyn XmlSerializable>>,
}

impl XmlSerializable for Fleet {
    fn element_name(&self) -> &str {
        "fleet"
    }

    fn type_name(&self) -> &str {
        "FleetType"
    }

    fn write_content(&self, writer: &mut XmlWriter) -> Result<()> {
        writer.write_text_element("name", &self.name)?;
        for vehicle in &self.vehicles {
            write_polymorphic(writer, &**vehicle, false)?;
        }
        Ok(())
    }

    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<bool> {
        if child.name() == "name" {
            self.name = reader.read_text()?;
            return Ok(true);
        }
        if !ctx.registry().is_substitutable(child.name(), "vehicle") {
            return Ok(false);
        }
        match read_polymorphic(child, reader, ctx)? {
            Some(vehicle) => {
                self.vehicles.push(vehicle);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Returns the vehicle part of any vehicle-like instance.
pub fn vehicle_view(instance: &dyn XmlSerializable) -> Option<&Vehicle> {
    instance
        .downcast_ref::<Vehicle>()
        .or_else(|| instance.downcast_ref::<Car>().map(|car| &car.vehicle))
        .or_else(|| instance.downcast_ref::<Truck>().map(|truck| &truck.vehicle))
}

pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register_type::<Vehicle>();
    registry.register_type::<Car>();
    registry.register_type::<Truck>();
    registry.register_type::<Fleet>();
    registry.register_substitute("car", "vehicle");
    registry.register_substitute("truck", "vehicle");
    registry
}
