//! User-facing message strings. All Italian, like the audience.

pub const LOGIN_PROMPT: &str = "Inserisci il tuo gruppo dei turni 🔥\n\n\
    Questa informazione mi è essenziale per fornirti i turni corretti ️✅";

pub const COMMAND_LIST: &str = "🔔 *Comandi*: \n\n\
    /turni - Per visualizzare i tuoi turni 📅\n\
    /domani - Per visualizzare il turno di domani 🔜\n\
    /notifiche - Per impostare gli avvisi 📢\n";

pub const GROUP_FORMAT_INVALID: &str = "Il codice gruppo inserito non è in un formato valido ⚠\n\
    Inserisci il codice gruppo di nuovo! 😑";

pub const GROUP_UNKNOWN: &str = "Il codice gruppo inserito non è tra quelli validi ⚠\n\
    Inserisci il codice gruppo corretto! 😑";

pub const LOGIN_REQUIRED: &str =
    "Devi prima comunicare il tuo gruppo per utilizzare questo comando! ⛔";

pub const GROUP_FORGOTTEN: &str = "Scusami tanto, ma mi sono dimenticato il tuo gruppo 😕\n\
    Devi ri effettuare il login per poter utilizzare questo comando";

pub const NOTIFICATION_MENU: &str =
    "Attraverso le notifiche ti posso avvertire sui turni che dovrai effettuare 🚨";

pub const NOTIFICATION_KIND_PROMPT: &str = "Scegli il tipo di notifica da aggiungere 📢 \n\
    Attenzione ⚠ La notifica verrà mandata solo se il giorno successivo sarai in Smart o Ufficio, \
    a seconda del tipo selezionato";

pub const TIME_PROMPT: &str = "Inserisci l'orario in cui inviare la notifica, nel formato HH:MM 🕐";

pub const TIME_FORMAT_INVALID: &str = "L'orario deve essere nel formato HH:MM ⚠️";

pub const NOTIFICATION_ADDED: &str = "Notifica aggiunta! ✅";

pub const NOTIFICATION_REMOVED: &str = "Notifica rimossa! ✅";

pub const NO_DAYS_SELECTED: &str = "È necessario selezionare almeno un giorno ⚠";

pub const REMOVE_INDEX_PROMPT: &str = "Invia il numero della notifica da rimuovere ✍🏽\n\n";

pub const REMOVE_INDEX_INVALID: &str = "Devi inserire il numero della notifica da rimuovere 🔢";

pub const REMINDER_GROUP_LOST: &str =
    "Hey! Dovrei avvisarti sui turni, ma non ho più il tuo gruppo per poter verificare 😕";

pub fn welcome(bot_name: &str) -> String {
    format!(
        "👋 Ciao! Io sono *{bot_name}*! Con me potrai capire i tuoi turni di presenza senza dover \
         aprire ogni volta email, excel o altri strumenti ormai obsoleti 🔥\n\n\
         Ma prima di iniziare devi effettuare il login, digitando il tuo codice gruppo! 😊"
    )
}

pub fn group_saved() -> String {
    format!(
        "Gruppo salvato con successo! 😊\n\n{COMMAND_LIST}/aiuto - Per visualizzare la pagina di aiuto 🚑"
    )
}

pub fn help(bot_name: &str, group_code: Option<&str>) -> String {
    let mut message = format!("🔷 Riepilogo *{bot_name}* \n\n");
    match group_code {
        Some(code) => {
            message += &format!("Hai effettuato l'accesso con il codice gruppo *{code}* 😊");
        }
        None => {
            message += "Attualmente non hai ancora fatto l'accesso selezionando il tuo gruppo \
                        dei turni. Utilizza il comando /login.";
        }
    }
    message += "\n\nDi seguito trovi l'elenco dei comandi disponibili 🔥\n\n";
    message += COMMAND_LIST;
    message += "/aiuto - Per visualizzare questo messaggio 🚑\n\n\
                🚑 *Problemi?* \n\
                Contatta gli amministratori di sistema, ti sapranno aiutare nel miglior modo \
                possibile 😊";
    message
}

pub fn available_groups(codes: &[String]) -> String {
    format!("Gruppi disponibili: {}", codes.join(", "))
}
