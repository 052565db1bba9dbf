//! Example loading a schema and a polymorphic fleet document.
//!
//! Run with: `cargo run --example fleet`
//! Set `RUST_LOG=ironxsd_core=trace` to see skipped elements.

use chrono::NaiveDate;
use ironxsd::prelude::*;

const FLEET_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           targetNamespace="urn:example:fleet"
           elementFormDefault="qualified">
    <xs:element name="fleet" type="FleetType"/>
    <xs:element name="vehicle" type="VehicleType"/>
    <xs:element name="car" type="CarType" substitutionGroup="vehicle"/>

    <xs:complexType name="VehicleType">
        <xs:sequence>
            <xs:element name="licensePlate" type="xs:string"/>
            <xs:element name="year" type="xs:int"/>
            <xs:element name="registeredOn" type="xs:date" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="id" type="xs:ID" use="required"/>
    </xs:complexType>

    <xs:complexType name="CarType">
        <xs:complexContent>
            <xs:extension base="VehicleType">
                <xs:sequence>
                    <xs:element name="numDoors" type="xs:int"/>
                </xs:sequence>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>

    <xs:complexType name="FleetType">
        <xs:sequence>
            <xs:element name="name" type="xs:string"/>
            <xs:element ref="vehicle" minOccurs="0" maxOccurs="unbounded"/>
        </xs:sequence>
    </xs:complexType>
</xs:schema>"#;

const FLEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fleet xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <name>Depot North</name>
    <vehicle id="V1">
        <licensePlate>AB-123</licensePlate>
        <year>2019</year>
        <color>blue</color>
    </vehicle>
    <car id="C1">
        <licensePlate>X-1</licensePlate>
        <year>2024</year>
        <registeredOn>2024-03-01</registeredOn>
        <numDoors>4</numDoors>
    </car>
    <vehicle id="C2" xsi:type="CarType">
        <licensePlate>X-2</licensePlate>
        <year>2022</year>
        <numDoors>2</numDoors>
    </vehicle>
</fleet>"#;

#[derive(Debug, Clone, Default)]
struct Vehicle {
    id: String,
    license_plate: String,
    year: i32,
    registered_on: Option<NaiveDate>,
}

impl XmlSerializable for Vehicle {
    fn element_name(&self) -> &str {
        "vehicle"
    }

    fn type_name(&self) -> &str {
        "VehicleType"
    }

    fn write_attributes(&self, writer: &mut XmlWriter) -> CoreResult<()> {
        writer.write_attribute("id", &self.id)
    }

    fn write_content(&self, writer: &mut XmlWriter) -> CoreResult<()> {
        writer.write_text_element("licensePlate", &self.license_plate)?;
        writer.write_element("year", &self.year)?;
        writer.write_optional("registeredOn", &self.registered_on)
    }

    fn read_attributes(&mut self, start: &StartTag, _ctx: &ReadContext<'_>) -> CoreResult<()> {
        self.id = start.attribute("id").unwrap_or_default().to_string();
        Ok(())
    }

    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> CoreResult<bool> {
        match child.name() {
            "licensePlate" => self.license_plate = reader.read_text()?,
            "year" => self.year = reader.read_scalar(child, ctx)?,
            "registeredOn" => self.registered_on = Some(reader.read_scalar(child, ctx)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Default)]
struct Car {
    vehicle: Vehicle,
    num_doors: i32,
}

impl XmlSerializable for Car {
    fn element_name(&self) -> &str {
        "car"
    }

    fn type_name(&self) -> &str {
        "CarType"
    }

    fn write_attributes(&self, writer: &mut XmlWriter) -> CoreResult<()> {
        self.vehicle.write_attributes(writer)
    }

    fn write_content(&self, writer: &mut XmlWriter) -> CoreResult<()> {
        self.vehicle.write_content(writer)?;
        writer.write_element("numDoors", &self.num_doors)
    }

    fn read_attributes(&mut self, start: &StartTag, ctx: &ReadContext<'_>) -> CoreResult<()> {
        self.vehicle.read_attributes(start, ctx)
    }

    fn read_child(
        &mut self,
        child: &StartTag,
        reader: &mut XmlReader<'_>,
        ctx: &ReadContext<'_>,
    ) -> CoreResult<bool> {
        if child.name() == "numDoors" {
            self.num_doors = reader.read_scalar(child, ctx)?;
            return Ok(true);
        }
        self.vehicle.read_child(child, reader, ctx)
    }
}

#[derive(Debug, Default)]
struct Fleet {
    name: String,
    vehicles: Vec<Box<dyn XmlSerializable>>,
}

impl XmlSerializable for Fleet {
    fn element_name(&self) -> &str {
        "fleet"
    }

    fn type_name(&self) -> &str {
        "FleetType"
    }

    fn write_content(&self, writer: &mut XmlWriter) -> CoreResult<()> {
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
    ) -> CoreResult<bool> {
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

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let schema = parse_schema(FLEET_XSD)?;
    validate_schema(&schema)?;
    let ir = SchemaIr::from_schema(&schema);

    println!(
        "Schema {}: {} types, {} elements",
        schema.target_namespace.as_deref().unwrap_or("(no namespace)"),
        schema.types.len(),
        schema.elements.len()
    );
    for resolved in &ir.types {
        println!(
            "  {} -> {} fields, bases {:?}",
            resolved.rust_name,
            resolved.all_elements.len(),
            resolved.base_chain
        );
    }

    let mut registry = TypeRegistry::new();
    registry.register_type::<Fleet>();
    registry.register_type::<Vehicle>();
    registry.register_type::<Car>();
    register_substitution_groups(&schema, &mut registry);

    let missing = missing_registrations(&ir, &registry);
    if !missing.is_empty() {
        println!("Unbound elements: {missing:?}");
    }

    let mut doc = XmlDocument::<Fleet>::new();
    doc.load_str(FLEET_XML, &registry)?;

    if let Some(fleet) = doc.root() {
        println!("Fleet '{}' with {} vehicles:", fleet.name, fleet.vehicles.len());
        for vehicle in &fleet.vehicles {
            if let Some(car) = vehicle.downcast_ref::<Car>() {
                println!(
                    "  car {} ({}), {} doors",
                    car.vehicle.id, car.vehicle.license_plate, car.num_doors
                );
            } else if let Some(base) = vehicle.downcast_ref::<Vehicle>() {
                println!("  vehicle {} ({})", base.id, base.license_plate);
            }
        }
    }

    println!();
    println!("{}", doc.save_to_string()?);
    Ok(())
}
