//! Provides ready to use [`NamedNodeRef`](oxrdf::NamedNodeRef)s for the vocabularies this crate emits.

pub mod void {
    //! [VoID](https://www.w3.org/TR/void/) vocabulary.
    use oxrdf::NamedNodeRef;

    /// The VoID namespace, bound to the `void` prefix in serialized output.
    pub const NS: &str = "http://rdfs.org/ns/void#";

    /// The class a class-based partition is about.
    pub const CLASS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#class");
    /// The total number of distinct classes in a dataset.
    pub const CLASSES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#classes");
    /// A subset of a dataset containing the entities of a given class.
    pub const CLASS_PARTITION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#classPartition");
    /// The total number of distinct objects in a dataset.
    pub const DISTINCT_OBJECTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#distinctObjects");
    /// The total number of distinct subjects in a dataset.
    pub const DISTINCT_SUBJECTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#distinctSubjects");
    /// The total number of entities described in a dataset.
    pub const ENTITIES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#entities");
    /// An example entity of a dataset.
    pub const EXAMPLE_RESOURCE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#exampleResource");
    /// The total number of distinct properties in a dataset.
    pub const PROPERTIES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#properties");
    /// The property a property-based partition is about.
    pub const PROPERTY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#property");
    /// A subset of a dataset containing the triples of a given property.
    pub const PROPERTY_PARTITION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#propertyPartition");
    /// A SPARQL protocol endpoint of a dataset.
    pub const SPARQL_ENDPOINT: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#sparqlEndpoint");
    /// The total number of triples in a dataset.
    pub const TRIPLES: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#triples");
    /// A URI prefix common to the entities of a dataset.
    pub const URI_SPACE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#uriSpace");
    /// A vocabulary used in a dataset.
    pub const VOCABULARY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://rdfs.org/ns/void#vocabulary");
}
